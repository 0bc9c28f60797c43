//! Scan-session orchestration for the bottle deposit kiosk.
//!
//! `Session` holds the per-scan count and the de-duplication latch.
//! `Worker` drives it from serial tokens and camera frames and runs the
//! voucher exchange when a scan ends.

pub mod config;
pub mod error;
pub mod session;
pub mod worker;

pub use config::Config;
pub use error::SessionError;
pub use session::{Session, SessionState, Status};
pub use worker::{Cycle, VoucherPolicy, Worker};
