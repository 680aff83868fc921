//! Core data structures and traits for viewmesh
//!
//! This crate provides the fundamental types for converting multi-camera
//! depth video into per-frame triangle meshes: camera calibration, frame
//! input buffers, candidate and composited meshes, and the capability
//! traits behind which the decode/mask producers and the decimation
//! backend live.

pub mod camera;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod point;
pub mod traits;
pub mod transform;

pub use camera::*;
pub use error::*;
pub use frame::*;
pub use mesh::*;
pub use point::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};

/// Common result type for viewmesh operations
pub type Result<T> = std::result::Result<T, Error>;
