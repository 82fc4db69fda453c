//! Commander dispatch daemon.
//!
//! A registry of pluggable commands served over HTTP on a Unix domain socket:
//! clients POST a JSON envelope naming a command and its parameters, the
//! dispatcher routes it to the registered handler and replies with a JSON
//! payload. Execution counters and a command listing are served alongside.
//!
//! The binary lives in `main.rs`; everything here is library code so the
//! integration tests can run the daemon in-process.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod registry;
pub mod socket;
pub mod status;
pub mod watchdog;
