use thiserror::Error;

/// Failure modes of the read layer.
///
/// Read paths never surface these to HTTP clients; the boundary collapses
/// them to an empty list or `null` after logging (see `utils::or_empty`).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("query failed: {0}")]
    Query(String),
}

impl From<libsql::Error> for ReadError {
    fn from(err: libsql::Error) -> Self {
        ReadError::Query(err.to_string())
    }
}
