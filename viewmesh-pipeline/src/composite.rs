//! World-space composition of per-camera meshes
//!
//! Folds one camera's simplified camera-space mesh into the frame's
//! accumulated world-space mesh. The triangle index offset is derived
//! from the frame mesh's current vertex count, so camera index ranges
//! stay disjoint without any running counter outside the mesh itself.

use viewmesh_core::{CandidateMesh, FrameMesh, Transform3D};

/// Transform a camera's mesh to world space and append it to the frame.
pub fn composite_into(frame: &mut FrameMesh, mesh: &CandidateMesh, model: &Transform3D) {
    let offset = frame.vertices.len() as u32;

    frame
        .vertices
        .extend(mesh.vertices.iter().map(|v| model.transform_point(v)));
    frame.triangles.extend(mesh.triangles.iter().map(|t| {
        [
            offset + t.vertices[0] as u32,
            offset + t.vertices[1] as u32,
            offset + t.vertices[2] as u32,
        ]
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use viewmesh_core::{CandidateTriangle, Point3f};

    fn camera_mesh() -> CandidateMesh {
        CandidateMesh::from_parts(
            vec![
                Point3f::new(0.0, 0.0, -1.0),
                Point3f::new(1.0, 0.0, -1.0),
                Point3f::new(0.0, 1.0, -1.0),
            ],
            vec![CandidateTriangle::new([0, 1, 2], false)],
        )
    }

    #[test]
    fn test_appends_with_offset() {
        let mut frame = FrameMesh::new();
        composite_into(&mut frame, &camera_mesh(), &Transform3D::identity());
        composite_into(&mut frame, &camera_mesh(), &Transform3D::identity());

        assert_eq!(frame.vertex_count(), 6);
        assert_eq!(frame.triangle_count(), 2);
        assert_eq!(frame.triangles[0], [0, 1, 2]);
        assert_eq!(frame.triangles[1], [3, 4, 5]);
        assert!(frame.indices_in_bounds());
    }

    #[test]
    fn test_model_transform_is_applied() {
        let mut frame = FrameMesh::new();
        let model = Transform3D::translation(Vector3::new(10.0, 0.0, 0.0));
        composite_into(&mut frame, &camera_mesh(), &model);

        assert_relative_eq!(frame.vertices[0].x, 10.0);
        assert_relative_eq!(frame.vertices[1].x, 11.0);
        assert_relative_eq!(frame.vertices[0].z, -1.0);
    }

    #[test]
    fn test_index_ranges_disjoint_across_cameras() {
        let mut frame = FrameMesh::new();
        composite_into(&mut frame, &camera_mesh(), &Transform3D::identity());
        let first_range: Vec<u32> = frame.triangles.iter().flat_map(|t| *t).collect();

        composite_into(
            &mut frame,
            &camera_mesh(),
            &Transform3D::translation(Vector3::new(5.0, 0.0, 0.0)),
        );
        let second_range: Vec<u32> = frame.triangles[1..].iter().flat_map(|t| *t).collect();

        let max_first = *first_range.iter().max().unwrap();
        let min_second = *second_range.iter().min().unwrap();
        assert!(max_first < min_second);
    }

    #[test]
    fn test_empty_camera_contributes_nothing() {
        let mut frame = FrameMesh::new();
        composite_into(&mut frame, &camera_mesh(), &Transform3D::identity());
        composite_into(&mut frame, &CandidateMesh::new(), &Transform3D::identity());
        assert_eq!(frame.vertex_count(), 3);
        assert_eq!(frame.triangle_count(), 1);
    }
}
