use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures raised by the CouchDB game store.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer (connection refused, timeout, TLS...).
    #[error("CouchDB request to `{path}` failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for `{path}`")]
    UnexpectedStatus { path: String, status: StatusCode },
    /// `_rev` moved between read and write.
    #[error("CouchDB revision conflict on `{path}`")]
    Conflict { path: String },
    #[error("gave up writing `{path}` after {attempts} revision conflicts")]
    ConflictRetriesExhausted { path: String, attempts: u32 },
    #[error("unreadable CouchDB payload for `{path}`")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB document under `{path}` is not a game")]
    NotAGame {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid game document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}
