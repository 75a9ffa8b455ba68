//! Blocking JSON client for the PSA backend.
//!
//! Only the endpoints the project editor needs:
//! - `GET /projects/{id}`: load the hierarchy
//! - `PUT /tasks/{id}`, `PUT /stories/{id}`: persist a parent change
//! - `POST /phases`, `POST /sprints`, `POST /tasks`, `POST /stories`: create entities

use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::session::Session;
use crate::model::container::{Container, ContainerKind, ContainerRef};
use crate::model::item::{EntityId, LeafItem};
use crate::model::project::Project;
use crate::ops::budget::recompute_project;

const USER_AGENT: &str = concat!("planboard/", env!("CARGO_PKG_VERSION"));

/// Errors from backend calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The token is missing, invalid or expired
    #[error("backend rejected the session (401 Unauthorized); run `pb login --token <token>`")]
    Unauthorized,

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// DNS, connect, TLS or timeout failures
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Fields for a phase or sprint about to be created
#[derive(Debug, Clone)]
pub struct NewContainer {
    pub project_id: EntityId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Fields for a task or story about to be created
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_hours: f64,
}

pub struct ApiClient {
    agent: ureq::Agent,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        ApiClient { agent, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch a project with its phases/tasks and sprints/stories. Container
    /// totals are recomputed from the items.
    pub fn fetch_project(&self, project_id: EntityId) -> Result<Project, ApiError> {
        let mut project: Project = self.send("GET", &format!("projects/{}", project_id), None)?;
        recompute_project(&mut project);
        Ok(project)
    }

    /// `PUT /tasks/{id}` or `PUT /stories/{id}` carrying the item's current
    /// fields and `parent` as its owner.
    pub fn update_item(&self, parent: ContainerRef, item: &LeafItem) -> Result<(), ApiError> {
        let path = format!("{}/{}", parent.kind().items_endpoint(), item.id);
        let body = item_body(parent, item);
        self.send::<Value>("PUT", &path, Some(body))?;
        Ok(())
    }

    pub fn create_container(
        &self,
        kind: ContainerKind,
        new: &NewContainer,
    ) -> Result<Container, ApiError> {
        let body = json!({
            "project_id": new.project_id,
            "name": new.name,
            "start_date": new.start_date,
            "end_date": new.end_date,
        });
        self.send("POST", kind.endpoint(), Some(body))
    }

    pub fn create_item(&self, parent: ContainerRef, new: &NewItem) -> Result<LeafItem, ApiError> {
        let mut body = json!({
            "name": new.name,
            "start_date": new.start_date,
            "end_date": new.end_date,
            "budget_hours": new.budget_hours,
        });
        body[parent.kind().parent_field()] = json!(parent.id());
        self.send("POST", parent.kind().items_endpoint(), Some(body))
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.session.url(path);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        if let Some(auth) = self.session.authorization() {
            request = request.set("Authorization", &auth);
        }
        tracing::debug!(method, url = %url, "backend request");

        let response = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        }
        .map_err(|e| map_error(&url, e))?;

        response.into_json::<T>().map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

/// Body for a parent change: `{ phase_id | sprint_id, name, start_date,
/// end_date, budget_hours }`
pub fn item_body(parent: ContainerRef, item: &LeafItem) -> Value {
    let mut body = json!({
        "name": item.name,
        "start_date": item.start_date,
        "end_date": item.end_date,
        "budget_hours": item.budget_hours,
    });
    body[parent.kind().parent_field()] = json!(parent.id());
    body
}

fn map_error(url: &str, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(401, _) => ApiError::Unauthorized,
        ureq::Error::Status(status, response) => ApiError::Status {
            status,
            url: url.to_string(),
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => ApiError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
