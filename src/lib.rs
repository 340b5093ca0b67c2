//! # wp-bridge
//!
//! WordPress REST API bridge over standard input/output for AI-agent
//! integration.
//!
//! The bridge reads one JSON request per line from stdin, dispatches on the
//! request's `tool` field to an authenticated WordPress REST call, and writes
//! one JSON result envelope per line to stdout. Diagnostics go to stderr so
//! stdout stays a clean protocol channel.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;

pub use bridge::{BridgeServer, ToolRequest, ToolResponse};
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use handlers::WordPressHandler;
