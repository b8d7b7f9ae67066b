//! Docvault Common Library
//!
//! Shared error handling and logging setup for the docvault workspace.
//!
//! # Example
//!
//! ```no_run
//! use docvault_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> docvault_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DocvaultError, Result};
