use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A router cannot be built without somewhere to receive events from.
    #[error("a transport is required")]
    MissingTransport,

    #[error(transparent)]
    Transport(#[from] graceless_channels::Error),

    #[error(transparent)]
    Store(#[from] graceless_users::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl graceless_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

impl From<Error> for graceless_common::Error {
    fn from(err: Error) -> Self {
        Self::other(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

graceless_common::impl_context!();
