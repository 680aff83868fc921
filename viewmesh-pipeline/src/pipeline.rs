//! Frame-sequential meshing loop
//!
//! Drives the whole conversion: per frame, each camera's inputs are
//! acquired, unprojected, classified into a candidate soup, reduced in
//! two passes and folded into the frame's world-space mesh, which is then
//! appended to the output stream. Cameras run strictly in sequence within
//! a frame because composition order determines index offsets; frames run
//! strictly in sequence because the stream is append-only.

use crate::builder::build_camera_mesh;
use crate::composite::composite_into;
use crate::simplify::{simplify_two_pass, SimplifyPasses};
use log::{debug, info};
use std::io::Write;
use viewmesh_core::{CameraRig, FrameMesh, FrameSource, Result, TriangleReducer};
use viewmesh_io::FrameStreamWriter;

/// Tunable parameters of the meshing core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Elongation threshold in depth sample units; triangles whose corner
    /// depths differ by this much or more are discarded.
    pub depth_threshold: f32,
    pub passes: SimplifyPasses,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            depth_threshold: 500.0,
            passes: SimplifyPasses::default(),
        }
    }
}

/// Mesh a single frame across every camera of the rig.
///
/// Any failure (short input buffers, reducer error) aborts the frame:
/// partial geometry would corrupt the cross-camera index offsets, so the
/// caller is expected to abort the run rather than skip ahead.
pub fn process_frame<S, R>(
    rig: &CameraRig,
    source: &mut S,
    reducer: &R,
    config: &PipelineConfig,
    frame: usize,
) -> Result<FrameMesh>
where
    S: FrameSource,
    R: TriangleReducer,
{
    let mut frame_mesh = FrameMesh::new();
    for (index, camera) in rig.cameras.iter().enumerate() {
        let inputs = source.acquire(frame, index)?;
        let mesh = build_camera_mesh(camera, &inputs, config.depth_threshold)?;
        debug!(
            "frame {} camera {}: {} candidate triangles",
            frame,
            index,
            mesh.triangle_count()
        );
        let mesh = simplify_two_pass(reducer, mesh, &config.passes)?;
        composite_into(&mut frame_mesh, &mesh, &camera.model);
    }
    Ok(frame_mesh)
}

/// Mesh every frame of the rig and append each to the output stream.
pub fn run<S, R, W>(
    rig: &CameraRig,
    source: &mut S,
    reducer: &R,
    config: &PipelineConfig,
    writer: &mut FrameStreamWriter<W>,
) -> Result<()>
where
    S: FrameSource,
    R: TriangleReducer,
    W: Write,
{
    for frame in 0..rig.frame_count as usize {
        let mesh = process_frame(rig, source, reducer, config, frame)?;
        writer.write_frame(&mesh)?;
        info!(
            "frame {}/{}: {} vertices, {} triangles",
            frame + 1,
            rig.frame_count,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }
    writer.flush()
}
