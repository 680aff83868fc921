//! Camera calibration and rig configuration
//!
//! A [`Camera`] holds the immutable per-run calibration of one input view:
//! pixel resolution, pinhole intrinsics, the near/far depth range used to
//! quantize depth samples, and the model transform mapping camera space to
//! world space. A [`CameraRig`] groups all views of a capture together with
//! the number of video frames, and is loaded once at startup from the
//! dataset's JSON parameter file.

use crate::error::{Error, Result};
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Largest representable depth sample, mapping to the near plane.
pub const DEPTH_SAMPLE_MAX: f64 = 65535.0;

/// Resolution bound accepted for input views, per dimension.
const MAX_RESOLUTION: u32 = 8192;

/// Calibration of a single input camera.
///
/// The camera looks down -Z with Y up; depth samples are quantized inverse
/// depth, with 0 on the far plane and 65535 on the near plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    pub focal_x: f32,
    pub focal_y: f32,
    pub principal_x: f32,
    pub principal_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Camera-to-world model transform.
    pub model: Transform3D,
}

impl Camera {
    /// Number of pixels in one frame of this camera.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Map a quantized depth sample to linear camera-space Z.
    ///
    /// Reciprocal interpolation between the far plane (sample 0) and the
    /// near plane (sample 65535); the returned Z is negative because the
    /// camera looks down -Z.
    pub fn depth_to_z(&self, sample: u16) -> f32 {
        let t = sample as f64 / DEPTH_SAMPLE_MAX;
        let inv_near = 1.0 / self.z_near as f64;
        let inv_far = 1.0 / self.z_far as f64;
        (-1.0 / (inv_far + t * (inv_near - inv_far))) as f32
    }

    /// Map a camera-space Z back to a continuous depth sample value.
    ///
    /// Inverse of [`Camera::depth_to_z`]; the result is not clamped or
    /// rounded, so callers can check quantization error directly.
    pub fn z_to_depth(&self, z: f32) -> f32 {
        let inv_near = 1.0 / self.z_near as f64;
        let inv_far = 1.0 / self.z_far as f64;
        let t = (-1.0 / z as f64 - inv_far) / (inv_near - inv_far);
        (t * DEPTH_SAMPLE_MAX) as f32
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.width < 1
            || self.width > MAX_RESOLUTION
            || self.height < 1
            || self.height > MAX_RESOLUTION
        {
            return Err(Error::Config(format!(
                "camera {}: resolution {}x{} outside [1, {}]",
                index, self.width, self.height, MAX_RESOLUTION
            )));
        }
        if !(self.z_near > 0.0 && self.z_far > self.z_near) {
            return Err(Error::Config(format!(
                "camera {}: depth range requires 0 < near < far, got near={} far={}",
                index, self.z_near, self.z_far
            )));
        }
        if self.focal_x == 0.0 || self.focal_y == 0.0 {
            return Err(Error::Config(format!(
                "camera {}: focal length must be nonzero",
                index
            )));
        }
        Ok(())
    }
}

/// The full set of calibrated input views for one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub cameras: Vec<Camera>,
    /// Number of video frames available from every camera.
    pub frame_count: u32,
}

impl CameraRig {
    /// Build a rig from cameras and a frame count, validating it.
    pub fn new(cameras: Vec<Camera>, frame_count: u32) -> Result<Self> {
        let rig = Self {
            cameras,
            frame_count,
        };
        rig.validate()?;
        Ok(rig)
    }

    /// Load and validate a rig from a JSON parameter file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let rig: CameraRig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Config(format!("camera rig JSON: {}", e)))?;
        rig.validate()?;
        Ok(rig)
    }

    /// Parse and validate a rig from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let rig: CameraRig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("camera rig JSON: {}", e)))?;
        rig.validate()?;
        Ok(rig)
    }

    /// Shared resolution of every view in the rig.
    pub fn resolution(&self) -> (u32, u32) {
        (self.cameras[0].width, self.cameras[0].height)
    }

    fn validate(&self) -> Result<()> {
        if self.cameras.is_empty() {
            return Err(Error::Config("camera rig contains no cameras".to_string()));
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            camera.validate(i)?;
        }
        let (width, height) = self.resolution();
        for (i, camera) in self.cameras.iter().enumerate() {
            if camera.width != width || camera.height != height {
                return Err(Error::Config(format!(
                    "camera {}: resolution {}x{} differs from camera 0 ({}x{})",
                    i, camera.width, camera.height, width, height
                )));
            }
        }
        Ok(())
    }
}
