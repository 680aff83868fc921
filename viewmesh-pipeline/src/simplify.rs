//! Two-pass simplification glue
//!
//! Each camera's candidate soup is reduced twice: an aggressive pass over
//! everything except edge-protected triangles, then a conservative pass
//! over the survivors with protection relaxed. Flat regions thin out
//! first; the detail kept by the first pass is then lightly reduced.

use log::debug;
use viewmesh_core::{CandidateMesh, Result, TriangleReducer};

/// Ratios and aggressiveness of the two reduction passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyPasses {
    /// First-pass target divisor: target = triangles / coarse_divisor.
    pub coarse_divisor: u32,
    /// Second-pass target divisor, applied to the first pass's output.
    pub fine_divisor: u32,
    /// Aggressiveness handed to the reducer on both passes.
    pub aggressiveness: f64,
}

impl Default for SimplifyPasses {
    fn default() -> Self {
        Self {
            coarse_divisor: 70,
            fine_divisor: 4,
            aggressiveness: 7.0,
        }
    }
}

/// Run the two reduction passes over one camera's candidate mesh.
///
/// Targets truncate (`18 / 70 == 0`); the reducer treats them as floors.
pub fn simplify_two_pass<R: TriangleReducer>(
    reducer: &R,
    mesh: CandidateMesh,
    passes: &SimplifyPasses,
) -> Result<CandidateMesh> {
    let target = mesh.triangle_count() / passes.coarse_divisor as usize;
    let mesh = reducer.reduce(&mesh, target, passes.aggressiveness, true)?;
    debug!("coarse pass left {} triangles", mesh.triangle_count());

    let target = mesh.triangle_count() / passes.fine_divisor as usize;
    let mesh = reducer.reduce(&mesh, target, passes.aggressiveness, false)?;
    debug!("fine pass left {} triangles", mesh.triangle_count());

    Ok(mesh)
}
