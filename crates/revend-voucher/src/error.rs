use std::fmt;

/// Every way a voucher request can fail to produce a usable code.
#[derive(Debug)]
pub enum VoucherError {
    /// Connection, timeout or other transport failure.
    Http(String),
    Status(u16),
    Decode(String),
    MissingCode,
}

impl fmt::Display for VoucherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherError::Http(msg) => write!(f, "voucher request failed: {msg}"),
            VoucherError::Status(code) => write!(f, "voucher service returned status {code}"),
            VoucherError::Decode(msg) => write!(f, "voucher response malformed: {msg}"),
            VoucherError::MissingCode => write!(f, "voucher code not found in response"),
        }
    }
}

impl std::error::Error for VoucherError {}

impl From<reqwest::Error> for VoucherError {
    fn from(err: reqwest::Error) -> Self {
        VoucherError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for VoucherError {
    fn from(err: serde_json::Error) -> Self {
        VoucherError::Decode(err.to_string())
    }
}
