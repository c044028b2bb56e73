//! Mandelpix rasterizes the Mandelbrot set into grayscale images.
//!
//! The pipeline is deliberately small:
//!
//! 1. **Describe**: build a validated [`RenderSpec`] (pixel dimensions, complex-plane bounds,
//!    iteration cap)
//! 2. **Select**: pick a compute backend for the running CPU ([`select_backend`])
//! 3. **Fill**: the backend populates a caller-owned byte buffer with escape-time samples
//! 4. **Encode**: write the buffer out as binary PGM or grayscale PNG
//!
//! Every backend implements the same contract and is observably equivalent;
//! [`BackendKind::Scalar`] is always available and serves as the reference implementation for
//! the vectorized variants (AVX and SSE2 on x86_64, NEON on aarch64). Vector capability is
//! detected once per process at render time, so the same binary uses the widest instruction
//! set the machine actually has.
#![deny(missing_docs)]

mod encode;
mod foundation;
mod render;

pub use encode::{read_sample, write_pgm, write_png, write_sample};
pub use foundation::core::RenderSpec;
pub use foundation::error::{MandelpixError, MandelpixResult};
pub use render::backend::{
    BackendKind, BackendPrefs, RenderBackend, create_backend, select_backend,
};
pub use render::caps::{CpuCaps, cpu_caps};
pub use render::pipeline::{RenderThreading, render_image};
pub use render::scalar::ScalarBackend;
