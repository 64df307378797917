use std::time::Duration;

use lithocore_mindat::MindatError;
use thiserror::Error;

/// Returned instead of queueing when a search is already in flight.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("a search session is already in flight")]
pub struct SessionBusy;

/// Why a session ended in `Failed`. Diagnostic only, never shown to users.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionFailure {
    #[error(transparent)]
    Provider(#[from] MindatError),

    #[error("session deadline of {}s exceeded", .0.as_secs_f64())]
    DeadlineExceeded(Duration),
}
