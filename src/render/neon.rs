//! NEON backend: 4 pixels per step.
//!
//! Counters live in integer lanes: subtracting the all-ones compare mask increments exactly
//! the lanes that are still bounded, so the count matches the scalar loop for
//! `iterations >= 2` like the x86 backends.

use core::arch::aarch64::{
    vaddq_f32, vcltq_f32, vdupq_n_f32, vdupq_n_u32, vld1q_f32, vmaxvq_u32, vmulq_f32, vst1q_u32,
    vsubq_f32, vsubq_u32,
};

use rayon::prelude::*;

use crate::encode::write_sample;
use crate::foundation::core::RenderSpec;
use crate::render::backend::{BackendKind, RenderBackend};
use crate::render::scalar::{self, ScalarBackend};

pub(crate) struct NeonBackend;

impl RenderBackend for NeonBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Neon
    }

    fn fill(&self, spec: &RenderSpec, image: &mut [u8]) {
        debug_assert_eq!(
            image.len(),
            spec.buffer_len(),
            "image buffer must be pre-sized to RenderSpec::buffer_len()"
        );
        if spec.iterations < 2 {
            // Lane counters cannot represent a zero escape count.
            return ScalarBackend.fill(spec, image);
        }
        let xscale = (spec.xlim[1] - spec.xlim[0]) / spec.width as f32;
        let yscale = (spec.ylim[1] - spec.ylim[0]) / spec.height as f32;
        image
            .par_chunks_mut(spec.row_bytes())
            .enumerate()
            .for_each(|(y, row)| {
                // SAFETY: NeonBackend is only constructed after runtime NEON detection.
                unsafe { fill_row(spec, xscale, yscale, y, row) }
            });
    }
}

#[target_feature(enable = "neon")]
unsafe fn fill_row(spec: &RenderSpec, xscale: f32, yscale: f32, y: usize, row: &mut [u8]) {
    let bpp = spec.bytes_per_pixel();
    let width = spec.width as usize;
    let ci_scalar = y as f32 * yscale + spec.ylim[0];

    // SAFETY: the caller guarantees NEON is available.
    unsafe {
        let xmin = vdupq_n_f32(spec.xlim[0]);
        let vxscale = vdupq_n_f32(xscale);
        let threshold = vdupq_n_f32(4.0);
        let ci = vdupq_n_f32(ci_scalar);

        let mut x = 0usize;
        while x + 4 <= width {
            let lanes = [x as f32, (x + 1) as f32, (x + 2) as f32, (x + 3) as f32];
            let mx = vld1q_f32(lanes.as_ptr());
            let cr = vaddq_f32(vmulq_f32(mx, vxscale), xmin);
            let mut zr = cr;
            let mut zi = ci;
            let mut k = 1u32;
            let mut mk = vdupq_n_u32(1);
            loop {
                k += 1;
                if k >= spec.iterations {
                    break;
                }
                let zr2 = vmulq_f32(zr, zr);
                let zi2 = vmulq_f32(zi, zi);
                let zrzi = vmulq_f32(zr, zi);
                zr = vaddq_f32(vsubq_f32(zr2, zi2), cr);
                zi = vaddq_f32(vaddq_f32(zrzi, zrzi), ci);

                let mag2 = vaddq_f32(vmulq_f32(zr, zr), vmulq_f32(zi, zi));
                let bounded = vcltq_f32(mag2, threshold);
                // Bounded lanes read 0xFFFFFFFF; subtracting -1 increments exactly those.
                mk = vsubq_u32(mk, bounded);
                if vmaxvq_u32(bounded) == 0 {
                    break;
                }
            }
            let mut counts = [0u32; 4];
            vst1q_u32(counts.as_mut_ptr(), mk);
            for (lane, &n) in counts.iter().enumerate() {
                write_sample(row, x + lane, bpp, n);
            }
            x += 4;
        }

        while x < width {
            let cr = x as f32 * xscale + spec.xlim[0];
            write_sample(
                row,
                x,
                bpp,
                scalar::escape_time(cr, ci_scalar, spec.iterations),
            );
            x += 1;
        }
    }
}
