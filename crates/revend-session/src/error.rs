use revend_serial::SerialError;
use std::fmt;

/// Conditions that stop the worker.
///
/// Camera, classifier and voucher failures never appear here; they are
/// logged and cost at most one loop iteration.
#[derive(Debug)]
pub enum SessionError {
    Transport(SerialError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(err) => write!(f, "controller link lost: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Transport(err) => Some(err),
        }
    }
}

impl From<SerialError> for SessionError {
    fn from(err: SerialError) -> Self {
        SessionError::Transport(err)
    }
}
