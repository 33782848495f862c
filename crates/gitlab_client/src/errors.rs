//! Error types for GitLab client operations.
//!
//! Besides describing what went wrong, every [`Error`] can be reduced to a
//! [`FailureKind`]. The retry engine only ever looks at that classification, so
//! nothing downstream has to inspect the shape of a transport or server error.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Server message GitLab sends when a label lookup by name misses.
pub const LABEL_NOT_FOUND_MESSAGE: &str = "404 Label Not Found";

/// Errors that can occur during GitLab client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use gitlab_client::{Error, FailureKind};
///
/// match client.list_labels(project_id).await {
///     Ok(labels) => println!("{} labels", labels.len()),
///     Err(e) if e.kind() == FailureKind::Other => eprintln!("Request failed: {}", e),
///     Err(e) => eprintln!("Benign failure: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connection refused, reset, DNS, ...).
    #[error("Request to GitLab failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A response arrived but its body could not be read completely.
    ///
    /// GitLab occasionally frames responses incorrectly, for instance by sending
    /// more bytes than the advertised content length. The HTTP layer reports
    /// those as body errors.
    #[error("Failed to read the GitLab response body: {0}")]
    Body(#[source] reqwest::Error),

    /// GitLab answered with a non-success status code.
    ///
    /// The message is the `message` (or `error`) field of the response body when
    /// one is present, otherwise the raw body text.
    #[error("GitLab returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not valid JSON or did not match the expected shape.
    #[error("Failed to deserialize GitLab response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The API base URI could not be parsed or joined with a request path.
    #[error("Invalid API base URI: {0}")]
    InvalidBaseUri(String),

    /// The access token cannot be carried in an HTTP header.
    #[error("The access token contains characters that are not valid in an HTTP header")]
    InvalidToken,

    /// A tolerated failure produced no payload where the caller needed one.
    #[error("GitLab returned no payload for a request that requires one")]
    MissingResponse,
}

/// Classification of a failed request, as seen by the retry engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server reported that the addressed label does not exist.
    LabelNotFound,

    /// The response framing or body was malformed.
    ParseOverrun,

    /// Anything else; retried until the retry limit is reached.
    Other,
}

impl Error {
    /// Reduces this error to the classification used by the retry engine.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Api { status: 404, message } if message == LABEL_NOT_FOUND_MESSAGE => {
                FailureKind::LabelNotFound
            }
            Error::Body(_) | Error::Deserialization(_) => FailureKind::ParseOverrun,
            _ => FailureKind::Other,
        }
    }

    /// Wraps a reqwest error, separating body failures from transport failures.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_body() || e.is_decode() {
            Error::Body(e)
        } else {
            Error::Transport(e)
        }
    }

    /// Builds an [`Error::Api`] from a status code and the raw response body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => match value.get("message").or_else(|| value.get("error")) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => body.to_string(),
            },
            Err(_) => body.to_string(),
        };

        Error::Api { status, message }
    }
}
