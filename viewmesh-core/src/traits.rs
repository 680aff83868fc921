//! Capability traits at the pipeline's external seams
//!
//! The decode/mask collaborators and the decimation backend are modeled as
//! traits so the meshing core can run against deterministic in-memory
//! implementations in tests.

use crate::error::Result;
use crate::frame::FrameInputs;
use crate::mesh::CandidateMesh;

/// Producer of decoded per-camera inputs for the current frame.
///
/// Implementations wrap the video decoder and the GPU pass that computes
/// the redundancy mask and edge map. Frames are requested in order and
/// cameras in sequence within a frame; a failure here aborts the run.
pub trait FrameSource {
    fn acquire(&mut self, frame: usize, camera: usize) -> Result<FrameInputs>;
}

/// Triangle-count reduction over a candidate mesh.
///
/// `target_triangles` is a floor, not a guarantee: an implementation may
/// stop early when further reduction would violate its own quality bound.
/// When `respect_keep` is set, triangles flagged `keep` must not be
/// collapsed away; the flag is ignored otherwise. An empty input mesh
/// reduces to an empty mesh. Output vertex buffers may be compacted, so
/// surviving triangle indices are renumbered.
pub trait TriangleReducer {
    fn reduce(
        &self,
        mesh: &CandidateMesh,
        target_triangles: usize,
        aggressiveness: f64,
        respect_keep: bool,
    ) -> Result<CandidateMesh>;
}
