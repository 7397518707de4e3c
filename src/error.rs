use thiserror::Error;

use crate::network::UserId;

/// Contract violations detected while building the friendship graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("friendship {from} - {to} references unknown user {missing}")]
    UnknownUser {
        from: String,
        to: String,
        missing: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .messages.join(" "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no user with id {0}")]
    UserNotFound(UserId),

    #[error("a user with id {0} already exists")]
    DuplicateUser(UserId),

    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("no friendship between {0} and {1}")]
    FriendshipNotFound(UserId, UserId),

    #[error("{0} and {1} are already friends")]
    DuplicateFriendship(UserId, UserId),

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
