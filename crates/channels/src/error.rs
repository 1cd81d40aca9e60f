/// Crate-wide result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed transport errors shared by every transport implementation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport does not know the requested user.
    #[error("unknown user: {user_id}")]
    UnknownUser { user_id: String },

    /// Operation is currently unavailable (not connected, stream closed).
    #[error("transport unavailable: {message}")]
    Unavailable { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_user(user_id: impl std::fmt::Display) -> Self {
        Self::UnknownUser {
            user_id: user_id.to_string(),
        }
    }
}

impl From<Error> for graceless_common::Error {
    fn from(err: Error) -> Self {
        Self::other(err)
    }
}
