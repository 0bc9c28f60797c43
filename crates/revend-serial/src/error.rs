use std::fmt;

#[derive(Debug)]
pub enum SerialError {
    Io(std::io::Error),
    /// A line arrived that was not valid UTF-8.
    Decode(String),
    LineTooLong(usize),
    ConnectionClosed,
}

impl SerialError {
    /// Whether the link is unusable and the worker must stop.
    ///
    /// Malformed lines only cost one loop iteration.
    pub fn is_fatal(&self) -> bool {
        match self {
            SerialError::Io(_) | SerialError::ConnectionClosed => true,
            SerialError::Decode(_) | SerialError::LineTooLong(_) => false,
        }
    }
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::Io(err) => write!(f, "serial io error: {err}"),
            SerialError::Decode(msg) => write!(f, "malformed line: {msg}"),
            SerialError::LineTooLong(len) => write!(f, "line too long: {len} bytes"),
            SerialError::ConnectionClosed => write!(f, "serial connection closed"),
        }
    }
}

impl std::error::Error for SerialError {}

impl From<std::io::Error> for SerialError {
    fn from(err: std::io::Error) -> Self {
        SerialError::Io(err)
    }
}

impl From<tokio_serial::Error> for SerialError {
    fn from(err: tokio_serial::Error) -> Self {
        SerialError::Io(err.into())
    }
}
