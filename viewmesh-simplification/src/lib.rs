//! Mesh reduction backends for viewmesh
//!
//! This crate provides the in-workspace implementation of the
//! [`viewmesh_core::TriangleReducer`] contract used by the two-pass
//! simplification stage: quadric error edge collapse with keep-flag
//! protection.

pub mod edge_collapse;

pub use edge_collapse::*;
