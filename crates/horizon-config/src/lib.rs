//! Gateway settings for Homelab Horizon.
//!
//! Settings live in a JSON file that may contain `//` and `/* */` comments.
//! A missing file is not an error: every setting has a default.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gateway;
pub mod jsonc;

pub use error::{ConfigError, Result};
pub use gateway::{GatewayConfig, DEFAULT_SEARCH_PATHS, FALLBACK_GATEWAY_IP};
pub use jsonc::strip_comments;
