pub mod api;
pub mod persistence;
pub mod session;

#[cfg(test)]
pub(crate) mod test_server;
