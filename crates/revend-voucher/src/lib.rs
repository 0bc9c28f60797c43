//! Client for the remote service that turns deposit time into voucher codes.

pub mod client;
pub mod error;

pub use client::{HttpVoucherClient, VoucherResult, VoucherService, parse_voucher_response};
pub use error::VoucherError;
