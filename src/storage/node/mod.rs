//! Node record format.
//!
//! This module contains:
//! - [`NodeHeader`] / [`NodeType`] - metadata at the start of every record
//! - [`NodeLayout`] - field positions derived from the tree order
//! - [`Node`] / [`NodeMut`] - typed accessors over a record slot

#[allow(clippy::module_inception)]
mod node;
mod node_header;
mod node_layout;

pub use node::{Node, NodeMut};
pub use node_header::{NodeHeader, NodeType};
pub use node_layout::NodeLayout;
