//! Hierarchy resolution for Common Core standards documents.
//!
//! Documents are parsed into [`node::Node`]s, registered by reference id in a
//! [`Registry`], and linked into a parent/child graph through the textual
//! parent references each entry declares.

pub mod corrector;
pub mod defects;
pub mod error;
pub mod grades;
pub mod kind;
pub mod loader;
pub mod node;
pub mod registry;
pub mod xml;


pub use defects::{NodeDefect, scan_defects};
pub use kind::Kind;
pub use loader::{LoadReport, Loader};
pub use registry::{LinkSummary, Registry};

/// Position of a node in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Position of a loaded document in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub usize);
