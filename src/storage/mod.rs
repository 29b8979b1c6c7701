//! Storage layer - the arena and the binary node format.
//!
//! - [`Arena`] - Append-only allocator addressed by offsets
//! - [`node`] - Node record layout and accessors

mod arena;
pub mod node;

pub use arena::{Arena, MAX_ARENA_BYTES};
