use std::fmt;

#[derive(Debug)]
pub enum ClassifyError {
    Backend(String),
    Shape(String),
    Io(String),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Backend(msg) => write!(f, "inference backend error: {msg}"),
            ClassifyError::Shape(msg) => write!(f, "shape error: {msg}"),
            ClassifyError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for ClassifyError {}

impl From<std::io::Error> for ClassifyError {
    fn from(err: std::io::Error) -> Self {
        ClassifyError::Io(err.to_string())
    }
}

impl From<revend_base::TensorError> for ClassifyError {
    fn from(err: revend_base::TensorError) -> Self {
        ClassifyError::Shape(err.to_string())
    }
}
