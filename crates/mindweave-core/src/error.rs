pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid concept tree at {path}: {message}")]
    InvalidTree { path: String, message: String },

    #[error("Concept tree JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTree {
            path: path.into(),
            message: message.into(),
        }
    }
}
