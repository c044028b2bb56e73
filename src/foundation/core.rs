use std::path::Path;

use crate::foundation::error::{MandelpixError, MandelpixResult};

/// Immutable description of one render: raster dimensions, the mapped rectangle of the complex
/// plane, and the escape-time iteration cap.
///
/// Built once per invocation via [`RenderSpec::new`] (or [`RenderSpec::from_path`]) and read-only
/// thereafter. Both constructors perform the caller-side validation the compute kernels rely on;
/// the kernels themselves never validate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderSpec {
    /// Output raster width in pixels. Must be positive.
    pub width: u32,
    /// Output raster height in pixels. Must be positive.
    pub height: u32,
    /// Maximum escape-time depth. Must lie in `1..=65535`.
    pub iterations: u32,
    /// Real-axis bounds `[lo, hi]`. `lo < hi` is expected but not enforced; a reversed pair
    /// yields a mirrored (well-defined) image, not an error.
    pub xlim: [f32; 2],
    /// Imaginary-axis bounds `[lo, hi]`.
    pub ylim: [f32; 2],
}

impl RenderSpec {
    /// Build a validated spec.
    pub fn new(
        width: u32,
        height: u32,
        iterations: u32,
        xlim: [f32; 2],
        ylim: [f32; 2],
    ) -> MandelpixResult<Self> {
        let spec = Self {
            width,
            height,
            iterations,
            xlim,
            ylim,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Load a spec from a JSON file and validate it.
    pub fn from_path(path: &Path) -> MandelpixResult<Self> {
        let file = std::fs::File::open(path)?;
        let spec: Self = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
            MandelpixError::serde(format!("invalid render spec '{}': {e}", path.display()))
        })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the invariants the compute kernels assume.
    pub fn validate(&self) -> MandelpixResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MandelpixError::validation(
                "width and height must be > 0",
            ));
        }
        if self.iterations == 0 || self.iterations >= 65536 {
            return Err(MandelpixError::validation(
                "iterations must be > 0 and < 65536",
            ));
        }
        Ok(())
    }

    /// Number of distinct output sample levels. Always equal to `iterations`; kept as an
    /// accessor so the output-format contract reads in terms of depth, not iteration count.
    pub fn depth(&self) -> u32 {
        self.iterations
    }

    /// Bytes per encoded sample: 1 while `depth() <= 256`, 2 (big endian) above that.
    pub fn bytes_per_pixel(&self) -> usize {
        if self.depth() > 256 { 2 } else { 1 }
    }

    /// Encoded length of one raster row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Required length of the output buffer, in bytes.
    pub fn buffer_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

impl Default for RenderSpec {
    /// The canonical full-set view: 1440x1080 over `x in [-2.5, 1.5]`, `y in [-1.5, 1.5]`,
    /// 256 iterations.
    fn default() -> Self {
        Self {
            width: 1440,
            height: 1080,
            iterations: 256,
            xlim: [-2.5, 1.5],
            ylim: [-1.5, 1.5],
        }
    }
}
