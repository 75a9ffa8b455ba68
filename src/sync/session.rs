/// Credentials and backend location shared by everything that talks to the
/// backend. Passed explicitly; there is no process-wide session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Session {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header, if logged in
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Absolute URL for a backend path such as `tasks/4`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Forget the token (logout, or the backend answered 401).
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    /// Point at another backend, logged out.
    pub fn reset(&mut self, base_url: impl Into<String>) {
        *self = Session::new(base_url, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header() {
        let session = Session::new("https://psa.example.com/api/", Some("abc".into()));
        assert_eq!(session.authorization().as_deref(), Some("Bearer abc"));
        assert_eq!(session.url("/tasks/4"), "https://psa.example.com/api/tasks/4");
    }

    #[test]
    fn blank_token_is_no_token() {
        let session = Session::new("http://x", Some("  ".into()));
        assert!(!session.is_authenticated());
        assert!(session.authorization().is_none());
    }

    #[test]
    fn invalidate_and_reset() {
        let mut session = Session::new("http://a", Some("t".into()));
        session.invalidate();
        assert!(!session.is_authenticated());
        assert_eq!(session.base_url(), "http://a");

        let mut session = Session::new("http://a", Some("t".into()));
        session.reset("http://b/");
        assert_eq!(session, Session::new("http://b", None));
    }
}
