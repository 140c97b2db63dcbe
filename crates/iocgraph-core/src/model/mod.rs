//! Input data model shared by the layering and hierarchy passes.
//!
//! - [`record`]: parsed indicator records and their advisory role.
//! - [`edge`]: raw (any-shape) edge descriptors and normalized edges.
//! - [`snapshot`]: one atomic node/edge snapshot as handed over by the
//!   extraction layer.

pub mod edge;
pub mod record;
pub mod snapshot;

pub use edge::{Edge, RawEdge};
pub use record::{IndicatorRecord, Role};
pub use snapshot::Snapshot;
