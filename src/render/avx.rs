//! AVX backend: 8 pixels per step.
//!
//! Lane counters start at 1 and count the updates on which a lane is still bounded, which
//! reproduces the scalar loop's increment-before-test count exactly for `iterations >= 2`.
//! A block retires only once every lane has escaped or the iteration cap is reached; escaped
//! lanes stop counting (their compare mask goes false) and may overflow to infinity harmlessly.

use core::arch::x86_64::{
    _CMP_LT_OS, _mm256_add_ps, _mm256_and_ps, _mm256_cmp_ps, _mm256_mul_ps, _mm256_set1_ps,
    _mm256_set_ps, _mm256_storeu_ps, _mm256_sub_ps, _mm256_testz_ps,
};

use rayon::prelude::*;

use crate::encode::write_sample;
use crate::foundation::core::RenderSpec;
use crate::render::backend::{BackendKind, RenderBackend};
use crate::render::scalar::{self, ScalarBackend};

pub(crate) struct AvxBackend;

impl RenderBackend for AvxBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Avx
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
                // SAFETY: AvxBackend is only constructed after runtime AVX detection.
                unsafe { fill_row(spec, xscale, yscale, y, row) }
            });
    }
}

#[target_feature(enable = "avx")]
unsafe fn fill_row(spec: &RenderSpec, xscale: f32, yscale: f32, y: usize, row: &mut [u8]) {
    let bpp = spec.bytes_per_pixel();
    let width = spec.width as usize;
    let ci_scalar = y as f32 * yscale + spec.ylim[0];

    // SAFETY: the caller guarantees AVX is available.
    unsafe {
        let xmin = _mm256_set1_ps(spec.xlim[0]);
        let vxscale = _mm256_set1_ps(xscale);
        let threshold = _mm256_set1_ps(4.0);
        let one = _mm256_set1_ps(1.0);
        let ci = _mm256_set1_ps(ci_scalar);

        let mut x = 0usize;
        while x + 8 <= width {
            let mx = _mm256_set_ps(
                (x + 7) as f32,
                (x + 6) as f32,
                (x + 5) as f32,
                (x + 4) as f32,
                (x + 3) as f32,
                (x + 2) as f32,
                (x + 1) as f32,
                x as f32,
            );
            let cr = _mm256_add_ps(_mm256_mul_ps(mx, vxscale), xmin);
            let mut zr = cr;
            let mut zi = ci;
            let mut k = 1u32;
            let mut mk = _mm256_set1_ps(1.0);
            loop {
                k += 1;
                if k >= spec.iterations {
                    break;
                }
                let zr2 = _mm256_mul_ps(zr, zr);
                let zi2 = _mm256_mul_ps(zi, zi);
                let zrzi = _mm256_mul_ps(zr, zi);
                zr = _mm256_add_ps(_mm256_sub_ps(zr2, zi2), cr);
                zi = _mm256_add_ps(_mm256_add_ps(zrzi, zrzi), ci);

                let zr2 = _mm256_mul_ps(zr, zr);
                let zi2 = _mm256_mul_ps(zi, zi);
                let mag2 = _mm256_add_ps(zr2, zi2);
                let bounded = _mm256_cmp_ps::<_CMP_LT_OS>(mag2, threshold);
                mk = _mm256_add_ps(_mm256_and_ps(bounded, one), mk);
                if _mm256_testz_ps(bounded, bounded) != 0 {
                    break;
                }
            }
            let mut counts = [0.0f32; 8];
            _mm256_storeu_ps(counts.as_mut_ptr(), mk);
            for (lane, &n) in counts.iter().enumerate() {
                write_sample(row, x + lane, bpp, n as u32);
            }
            x += 8;
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
