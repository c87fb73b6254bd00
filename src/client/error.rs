#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("transport error talking to the management API: `{0}`")]
    Transport(String),

    #[error("resource `{id}` not found")]
    NotFound { id: String },

    #[error("update rejected by the management API: `{reason}`")]
    Rejected { reason: String },

    #[error("conflicting update on `{id}`: `{reason}`")]
    Conflict { id: String, reason: String },
}
