//! Line-oriented link to the vending controller.
//!
//! The controller speaks newline-terminated UTF-8 text. `framing` reads and
//! writes single lines, `token` maps lines to protocol tokens, and `link`
//! wraps any async byte stream (a serial port in production, a
//! `tokio::io::duplex` pipe in tests) behind the `Transport` trait.

pub mod error;
pub mod framing;
pub mod link;
pub mod token;

pub use error::SerialError;
pub use link::{SerialLink, Transport, open};
pub use token::{Inbound, Outbound};
