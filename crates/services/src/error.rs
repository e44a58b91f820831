//! Shared error types for the services crate.

use thiserror::Error;

/// Errors from the session API facade.
///
/// Calls are plain request/response; nothing here retries. A failed call
/// halts progression and is surfaced to the player.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("server returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `GameController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameFlowError {
    /// Local validation: starting without a child profile never reaches
    /// the server.
    #[error("no child profile selected")]
    NoChildSelected,

    /// The session was never started or was reset; stale timers land here
    /// instead of touching a superseded session.
    #[error("no active session")]
    NoActiveSession,

    #[error("session is not in a presentable state")]
    NotPresenting,

    #[error("no answer is expected right now")]
    NotAwaitingAnswer,

    #[error("letter input only applies to the letter builder mode")]
    NotLetterMode,

    #[error(transparent)]
    Api(#[from] ApiError),
}
