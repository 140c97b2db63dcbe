#![forbid(unsafe_code)]
//! iocgraph-core library.
//!
//! Turns a snapshot of parsed indicator records and raw canvas edges into
//! two read-only views: a layered placement by maximum root distance
//! ([`graph::layers`]) and a role-aware parent/child hierarchy
//! ([`graph::hierarchy`]).
//!
//! # Conventions
//!
//! - **Errors**: Contract violations are [`error::GraphError`]; irregular
//!   data is reported through diagnostics, never as an error.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Purity**: Every entry point is a synchronous function of its inputs.
//!   Nothing is cached between calls.

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod resolve;
pub mod timestamp;

pub use error::{ErrorCode, GraphError};
pub use graph::{Analysis, Hierarchy, LayeredGraph, analyze, build_hierarchy, extract_layers};
pub use model::{Edge, IndicatorRecord, RawEdge, Role, Snapshot};
pub use resolve::EndpointResolver;
