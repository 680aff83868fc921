//! Depth-to-mesh conversion pipeline for viewmesh
//!
//! This crate turns calibrated multi-camera depth maps into one simplified
//! world-space triangle mesh per frame:
//! - depth unprojection to camera-space vertices
//! - per-square occlusion/validity classification and candidate assembly
//! - two-pass edge-aware reduction through a [`viewmesh_core::TriangleReducer`]
//! - world-space composition with disjoint per-camera index ranges
//! - the frame-sequential run loop feeding the output stream

pub mod builder;
pub mod classify;
pub mod composite;
pub mod pipeline;
pub mod simplify;
pub mod unproject;

pub use builder::*;
pub use classify::*;
pub use composite::*;
pub use pipeline::*;
pub use simplify::*;
pub use unproject::*;
