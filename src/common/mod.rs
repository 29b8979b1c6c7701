//! Common types and utilities shared across the crate.
//!
//! - Configuration constants and [`TreeConfig`]
//! - Error types
//! - [`NodeOffset`], the arena address of a node record

pub mod config;
pub mod error;
mod node_offset;

pub use config::TreeConfig;
pub use error::{Error, Result};
pub use node_offset::NodeOffset;
