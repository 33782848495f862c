//! Crate for interacting with the GitLab REST API.
//!
//! This crate provides a client for the handful of project and label endpoints
//! the label tooling needs, authenticated with a personal access token carried
//! in the `PRIVATE-TOKEN` header.
//!
//! Every request is routed through the [`retry`] engine: it is retried with a
//! linearly growing delay on ordinary failures, and a small set of known GitLab
//! quirks is converted into success instead of being retried.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument};
use url::Url;

pub mod errors;
pub use errors::{Error, FailureKind};

pub mod label;
pub use label::Label;

pub mod project;
pub use project::{ParseProjectIdError, Project, ProjectCreatePayload, ProjectId, Visibility};

pub mod retry;
pub use retry::{OverrunGuard, RetryPolicy};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Header GitLab reads personal access tokens from (`PRIVATE-TOKEN`; header
/// names are case-insensitive and `http` stores them lowercased).
pub const PRIVATE_TOKEN_HEADER: &str = "private-token";

/// Page size used for every listing request. GitLab caps `per_page` at 100.
pub const PAGE_SIZE: u32 = 100;

/// Parses an API base URI and makes sure it ends with a path separator, so that
/// relative request paths are appended to it rather than replacing its last
/// segment.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::normalize_base_uri;
///
/// let uri = normalize_base_uri("https://git.example.org/api/v4").unwrap();
/// assert_eq!(uri.as_str(), "https://git.example.org/api/v4/");
/// ```
pub fn normalize_base_uri(raw: &str) -> Result<Url, Error> {
    let with_separator = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&with_separator).map_err(|e| Error::InvalidBaseUri(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUri(format!(
            "'{raw}' cannot be used as a base URI"
        )));
    }

    Ok(url)
}

/// Trait for the project and label operations used by the label tooling.
///
/// [`GitLabClient`] implements it against a live GitLab instance; tests
/// implement it in memory.
#[async_trait]
pub trait ProjectClient: Send + Sync {
    /// Creates a project and returns it with its assigned id.
    async fn create_project(&self, payload: &ProjectCreatePayload) -> Result<Project, Error>;

    /// Deletes a project.
    async fn delete_project(&self, project_id: ProjectId) -> Result<(), Error>;

    /// Returns one page of the projects visible to the token, ordered by
    /// ascending id. Pages start at 1.
    async fn list_projects(&self, page: u32) -> Result<Vec<Project>, Error>;

    /// Returns the labels of a project, at most [`PAGE_SIZE`] of them.
    async fn list_labels(&self, project_id: ProjectId) -> Result<Vec<Label>, Error>;

    /// Creates a label on a project.
    async fn create_label(&self, project_id: ProjectId, label: &Label) -> Result<(), Error>;

    /// Deletes a label from a project by name. Deleting a label that does not
    /// exist succeeds.
    async fn delete_label(&self, project_id: ProjectId, name: &str) -> Result<(), Error>;
}

/// Description of one request, reused verbatim across retries.
#[derive(Debug)]
struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl RequestSpec {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A client for the GitLab REST API, authenticated with a personal access token.
///
/// The client owns the run-wide [`OverrunGuard`], so one client should be used
/// for exactly one run.
#[derive(Debug)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_uri: Url,
    retry: RetryPolicy,
    overrun_guard: OverrunGuard,
}

impl GitLabClient {
    /// Creates a client for the API rooted at `base_uri`.
    ///
    /// # Arguments
    ///
    /// * `base_uri` - The API root, e.g. `https://git.example.org/api/v4`. A
    ///   trailing `/` is added when missing.
    /// * `token` - The personal access token sent with every request.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBaseUri` if the URI cannot be parsed,
    /// `Error::InvalidToken` if the token cannot be sent as a header value and
    /// `Error::Transport` if the HTTP client cannot be built.
    pub fn new(base_uri: &str, token: &SecretString) -> Result<Self, Error> {
        let base_uri = normalize_base_uri(base_uri)?;

        let mut token_value =
            HeaderValue::from_str(token.expose_secret()).map_err(|_| Error::InvalidToken)?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN_HEADER, token_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("gitlab-fix-labels/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            http,
            base_uri,
            retry: RetryPolicy::default(),
            overrun_guard: OverrunGuard::new(),
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Returns the normalized API base URI.
    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Returns the run-wide guard for malformed `DELETE` responses.
    pub fn overrun_guard(&self) -> &OverrunGuard {
        &self.overrun_guard
    }

    /// Sends a request through the retry engine. `Ok(None)` means the request
    /// failed in a way that counts as success.
    async fn request<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<Option<T>, Error> {
        let spec = &spec;
        retry::execute(&self.retry, &self.overrun_guard, &spec.method, move || {
            self.send_once(spec)
        })
        .await
    }

    async fn send_once<T: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<T, Error> {
        let url = self
            .base_uri
            .join(&spec.path)
            .map_err(|e| Error::InvalidBaseUri(e.to_string()))?;

        debug!(method = %spec.method, url = %url, "Sending GitLab request");

        let mut builder = self.http.request(spec.method.clone(), url);
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Error::from_reqwest)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::from_reqwest)?;

        if !status.is_success() {
            return Err(Error::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&bytes),
            ));
        }

        // 204 No Content and friends decode as JSON null
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        Ok(serde_json::from_slice(body)?)
    }
}

#[async_trait]
impl ProjectClient for GitLabClient {
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    async fn create_project(&self, payload: &ProjectCreatePayload) -> Result<Project, Error> {
        let body = serde_json::to_value(payload)?;
        let spec = RequestSpec::new(Method::POST, "projects".to_string()).json(body);

        self.request(spec).await?.ok_or(Error::MissingResponse)
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, project_id: ProjectId) -> Result<(), Error> {
        let spec = RequestSpec::new(Method::DELETE, format!("projects/{project_id}"));

        self.request::<IgnoredAny>(spec).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_projects(&self, page: u32) -> Result<Vec<Project>, Error> {
        let spec = RequestSpec::new(Method::GET, "projects".to_string())
            .query("order_by", "id")
            .query("sort", "asc")
            .query("simple", true)
            .query("per_page", PAGE_SIZE)
            .query("page", page);

        self.request(spec).await?.ok_or(Error::MissingResponse)
    }

    #[instrument(skip(self))]
    async fn list_labels(&self, project_id: ProjectId) -> Result<Vec<Label>, Error> {
        let spec = RequestSpec::new(Method::GET, format!("projects/{project_id}/labels"))
            .query("per_page", PAGE_SIZE)
            .query("page", 1);

        self.request(spec).await?.ok_or(Error::MissingResponse)
    }

    #[instrument(skip(self, label), fields(label = %label.name))]
    async fn create_label(&self, project_id: ProjectId, label: &Label) -> Result<(), Error> {
        let mut spec = RequestSpec::new(Method::POST, format!("projects/{project_id}/labels"));
        for (key, value) in label.as_query() {
            spec = spec.query(key, value);
        }

        self.request::<IgnoredAny>(spec).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_label(&self, project_id: ProjectId, name: &str) -> Result<(), Error> {
        let spec = RequestSpec::new(Method::DELETE, format!("projects/{project_id}/labels"))
            .query("name", name);

        self.request::<IgnoredAny>(spec).await?;
        Ok(())
    }
}
