//! Depth unprojection
//!
//! Converts a camera's quantized depth grid into camera-space vertex
//! positions, one per pixel. The camera looks down -Z with Y up; pixel
//! centers sit at half-integer coordinates. Every pixel yields a vertex,
//! including pixels no triangle will ever reference.

use rayon::prelude::*;
use viewmesh_core::{Camera, Point3f};

/// Unproject one pixel's depth sample to a camera-space position.
pub fn unproject_pixel(camera: &Camera, row: usize, col: usize, sample: u16) -> Point3f {
    let z = camera.depth_to_z(sample);
    let x = -(col as f32 + 0.5 - camera.principal_x) / camera.focal_x * z;
    let y = (row as f32 + 0.5 - camera.principal_y) / camera.focal_y * z;
    Point3f::new(x, y, z)
}

/// Unproject a full depth grid, row-parallel.
///
/// The output is dense and row-major: vertex index = `row * width + col`.
pub fn unproject_grid(camera: &Camera, depth: &[u16]) -> Vec<Point3f> {
    let width = camera.width as usize;
    let height = camera.height as usize;
    debug_assert_eq!(depth.len(), width * height);

    (0..height)
        .into_par_iter()
        .flat_map_iter(|row| {
            let row_samples = &depth[row * width..(row + 1) * width];
            row_samples
                .iter()
                .enumerate()
                .map(move |(col, &sample)| unproject_pixel(camera, row, col, sample))
        })
        .collect()
}

/// Project a camera-space point back to continuous pixel coordinates.
///
/// Inverse of [`unproject_pixel`] up to depth quantization; returns
/// `(row, col)` where integer values land on pixel centers.
pub fn project_point(camera: &Camera, point: &Point3f) -> (f32, f32) {
    let row = point.y * camera.focal_y / point.z + camera.principal_y - 0.5;
    let col = camera.principal_x - 0.5 - point.x * camera.focal_x / point.z;
    (row, col)
}
