//! Per-camera mesh assembly
//!
//! Walks every 2x2 pixel square of one camera's frame in raster order,
//! applies the square classifier and appends the surviving triangles as
//! index triples into the dense per-pixel vertex buffer. Indices are not
//! renumbered here; offsetting across cameras happens at composition.

use crate::classify::{classify_square, square_protected, CornerValidity, SquareDepths};
use crate::unproject::unproject_grid;
use viewmesh_core::{
    Camera, CandidateMesh, CandidateTriangle, Error, FrameInputs, Result,
};

/// Build one camera's candidate mesh from its frame inputs.
pub fn build_camera_mesh(
    camera: &Camera,
    inputs: &FrameInputs,
    depth_threshold: f32,
) -> Result<CandidateMesh> {
    if inputs.width != camera.width || inputs.height != camera.height {
        return Err(Error::InvalidData(format!(
            "frame inputs are {}x{}, camera expects {}x{}",
            inputs.width, inputs.height, camera.width, camera.height
        )));
    }

    let width = camera.width as usize;
    let height = camera.height as usize;

    let vertices = unproject_grid(camera, &inputs.depth);
    let mut triangles = Vec::new();

    for row in 0..height.saturating_sub(1) {
        for col in 0..width.saturating_sub(1) {
            let o = row * width + col;
            let depths = SquareDepths::new(
                inputs.depth[o] as f32,
                inputs.depth[o + 1] as f32,
                inputs.depth[o + width] as f32,
                inputs.depth[o + width + 1] as f32,
            );
            let validity = CornerValidity::from_mask_bytes(
                inputs.mask[o],
                inputs.mask[o + 1],
                inputs.mask[o + width],
                inputs.mask[o + width + 1],
            );

            let emitted = classify_square(&depths, validity, depth_threshold);
            if emitted.count() == 0 {
                continue;
            }

            let keep = square_protected(inputs.edge[o], inputs.mask[o]);
            for triangle in emitted.triangles() {
                let indices = triangle.index_offsets(width).map(|offset| o + offset);
                triangles.push(CandidateTriangle::new(indices, keep));
            }
        }
    }

    Ok(CandidateMesh::from_parts(vertices, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewmesh_core::Transform3D;

    fn camera(width: u32, height: u32) -> Camera {
        Camera {
            width,
            height,
            focal_x: 10.0,
            focal_y: 10.0,
            principal_x: width as f32 / 2.0,
            principal_y: height as f32 / 2.0,
            z_near: 0.5,
            z_far: 50.0,
            model: Transform3D::identity(),
        }
    }

    fn inputs(camera: &Camera, depth: Vec<u16>, mask: Vec<u8>, edge: Vec<u8>) -> FrameInputs {
        FrameInputs::new(camera.width, camera.height, depth, mask, edge).unwrap()
    }

    #[test]
    fn test_flat_unmasked_grid_emits_two_triangles_per_square() {
        let camera = camera(4, 4);
        let inputs = inputs(&camera, vec![30000; 16], vec![0; 16], vec![0; 16]);
        let mesh = build_camera_mesh(&camera, &inputs, 500.0).unwrap();

        // 3x3 squares, two triangles each; the vertex buffer stays dense.
        assert_eq!(mesh.triangle_count(), 18);
        assert_eq!(mesh.vertex_count(), 16);
        assert!(mesh.indices_in_bounds());
        assert!(mesh.triangles.iter().all(|t| !t.keep));
    }

    #[test]
    fn test_masked_corner_emits_single_triangle_avoiding_it() {
        let camera = camera(2, 2);
        // Bottom-right pixel is redundant.
        let inputs = inputs(&camera, vec![30000; 4], vec![0, 0, 0, 1], vec![0; 4]);
        let mesh = build_camera_mesh(&camera, &inputs, 500.0).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        // The remaining triangle uses exactly the three non-redundant
        // corners: top-left (0), top-right (1), bottom-left (2).
        let mut used = mesh.triangles[0].vertices;
        used.sort();
        assert_eq!(used, [0, 1, 2]);
    }

    #[test]
    fn test_two_masked_corners_emit_nothing() {
        let camera = camera(2, 2);
        let inputs = inputs(&camera, vec![30000; 4], vec![0, 1, 1, 0], vec![0; 4]);
        let mesh = build_camera_mesh(&camera, &inputs, 500.0).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_depth_discontinuity_splits_mesh() {
        let camera = camera(3, 2);
        // A cliff between the left and right columns; squares crossing it
        // lose the triangles that span the jump.
        let depth = vec![
            1000, 1000, 9000, //
            1000, 1000, 9000,
        ];
        let inputs = inputs(&camera, depth, vec![0; 6], vec![0; 6]);
        let mesh = build_camera_mesh(&camera, &inputs, 500.0).unwrap();

        // Left square is flat: two triangles. Right square spans the cliff
        // along both columns: no compact triangle exists.
        assert_eq!(mesh.triangle_count(), 2);
        for triangle in &mesh.triangles {
            assert!(triangle.vertices.iter().all(|&v| v % 3 != 2));
        }
    }

    #[test]
    fn test_edge_flag_protects_only_unmasked_anchors() {
        let camera = camera(3, 2);
        let depth = vec![30000; 6];
        // Both square anchors are flagged as edges, but the right square's
        // anchor is also masked off as redundant, so only the left square's
        // triangles are protected.
        let mask = vec![0, 1, 0, 0, 0, 0];
        let edge = vec![1, 1, 0, 0, 0, 0];
        let inputs = inputs(&camera, depth, mask, edge);
        let mesh = build_camera_mesh(&camera, &inputs, 500.0).unwrap();

        // Each square loses one corner to the mask and emits one triangle.
        assert_eq!(mesh.triangle_count(), 2);
        let keep_flags: Vec<bool> = mesh.triangles.iter().map(|t| t.keep).collect();
        assert_eq!(keep_flags, vec![true, false]);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let cam = camera(4, 4);
        let wrong = FrameInputs::new(2, 2, vec![0; 4], vec![0; 4], vec![0; 4]).unwrap();
        assert!(build_camera_mesh(&cam, &wrong, 500.0).is_err());
    }

    #[test]
    fn test_single_row_grid_has_no_squares() {
        let cam = camera(4, 1);
        let inputs = inputs(&cam, vec![30000; 4], vec![0; 4], vec![0; 4]);
        let mesh = build_camera_mesh(&cam, &inputs, 500.0).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.is_empty());
    }
}
