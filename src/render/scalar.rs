//! Portable reference backend.
//!
//! One pixel at a time, one row per rayon task. Every other backend must agree with this one;
//! it is also the tail path for rows whose width is not a multiple of a vector's lane count.

use rayon::prelude::*;

use crate::encode::write_sample;
use crate::foundation::core::RenderSpec;
use crate::render::backend::{BackendKind, RenderBackend};

/// The always-available scalar backend.
pub struct ScalarBackend;

impl RenderBackend for ScalarBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scalar
    }

    fn fill(&self, spec: &RenderSpec, image: &mut [u8]) {
        debug_assert_eq!(
            image.len(),
            spec.buffer_len(),
            "image buffer must be pre-sized to RenderSpec::buffer_len()"
        );
        let xscale = (spec.xlim[1] - spec.xlim[0]) / spec.width as f32;
        let yscale = (spec.ylim[1] - spec.ylim[0]) / spec.height as f32;
        image
            .par_chunks_mut(spec.row_bytes())
            .enumerate()
            .for_each(|(y, row)| fill_row(spec, xscale, yscale, y, row));
    }
}

pub(crate) fn fill_row(spec: &RenderSpec, xscale: f32, yscale: f32, y: usize, row: &mut [u8]) {
    let bpp = spec.bytes_per_pixel();
    let ci = y as f32 * yscale + spec.ylim[0];
    for x in 0..spec.width as usize {
        let cr = x as f32 * xscale + spec.xlim[0];
        write_sample(row, x, bpp, escape_time(cr, ci, spec.iterations));
    }
}

/// Escape time of `c = cr + ci*i` under `z <- z^2 + c`, starting from `z = c`.
///
/// Performs at most `iterations - 1` map applications and counts the update on which the
/// squared magnitude first reaches 4, so the result always lies in `[0, iterations - 1]`.
/// The counter increments before the escape test; the vectorized backends reproduce this
/// exactly, so keep the loop shape in sync with them.
#[inline]
pub(crate) fn escape_time(cr: f32, ci: f32, iterations: u32) -> u32 {
    let mut zr = cr;
    let mut zi = ci;
    let mut n = 0u32;
    for _ in 1..iterations {
        let zr1 = zr * zr - zi * zi + cr;
        let zi1 = 2.0 * zr * zi + ci;
        zr = zr1;
        zi = zi1;
        n += 1;
        if zr * zr + zi * zi >= 4.0 {
            break;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::read_sample;

    #[test]
    fn far_corner_escapes_immediately() {
        // c = -2.5 - 1.5i has |c|^2 = 8.5; the first update pushes it past the radius.
        assert!(escape_time(-2.5, -1.5, 50) < 5);
    }

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(0.0, 0.0, 50), 49);
        assert_eq!(escape_time(0.0, 0.0, 65535), 65534);
    }

    #[test]
    fn single_iteration_spends_no_updates() {
        assert_eq!(escape_time(-2.5, -1.5, 1), 0);
        assert_eq!(escape_time(0.0, 0.0, 1), 0);
    }

    #[test]
    fn interior_point_saturates() {
        // c = -0.5 sits inside the main cardioid.
        assert_eq!(escape_time(-0.5, 0.0, 300), 299);
    }

    #[test]
    fn fill_covers_every_pixel_within_bounds() {
        let spec = RenderSpec::new(7, 5, 40, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let mut image = vec![0xFFu8; spec.buffer_len()];
        ScalarBackend.fill(&spec, &mut image);
        for i in 0..(spec.width * spec.height) as usize {
            assert!(read_sample(&image, i, spec.bytes_per_pixel()) <= 39);
        }
    }
}
