//! Sample packing and raster writers.
//!
//! Escape-time samples are serialized at 1 byte per pixel while `depth <= 256` and 2 bytes
//! big endian above that. The byte width is a property of the output format only; kernels
//! always produce an integer count in `[0, iterations - 1]`.

use std::io::Write;
use std::path::Path;

use crate::foundation::core::RenderSpec;
use crate::foundation::error::{MandelpixError, MandelpixResult};

/// Store one sample into a row at pixel column `x`.
///
/// `bytes_per_pixel` must match [`RenderSpec::bytes_per_pixel`] for the spec the row belongs to.
#[inline]
pub fn write_sample(row: &mut [u8], x: usize, bytes_per_pixel: usize, value: u32) {
    if bytes_per_pixel == 2 {
        let off = x * 2;
        row[off] = (value >> 8) as u8;
        row[off + 1] = value as u8;
    } else {
        row[x] = value as u8;
    }
}

/// Read back the sample at flat pixel index `i`.
#[inline]
pub fn read_sample(buf: &[u8], i: usize, bytes_per_pixel: usize) -> u32 {
    if bytes_per_pixel == 2 {
        let off = i * 2;
        (u32::from(buf[off]) << 8) | u32::from(buf[off + 1])
    } else {
        u32::from(buf[i])
    }
}

/// Write the buffer as a binary netpbm graymap (P5).
///
/// Maxval is `depth - 1`; samples above 255 are already stored big endian, which is exactly
/// the byte order P5 requires, so the payload is emitted verbatim.
pub fn write_pgm<W: Write>(mut w: W, spec: &RenderSpec, image: &[u8]) -> MandelpixResult<()> {
    write!(w, "P5\n{} {}\n{}\n", spec.width, spec.height, spec.depth() - 1)?;
    w.write_all(image)?;
    Ok(())
}

/// Write the buffer as a grayscale PNG (8- or 16-bit to match the sample width).
///
/// The encoder wants 16-bit samples in native byte order and handles the big-endian
/// conversion PNG requires itself, so wide samples are re-packed from the raster's
/// big-endian layout before encoding.
pub fn write_png(path: &Path, spec: &RenderSpec, image: &[u8]) -> MandelpixResult<()> {
    if spec.bytes_per_pixel() == 2 {
        let mut native = Vec::with_capacity(image.len());
        for pair in image.chunks_exact(2) {
            let sample = u16::from_be_bytes([pair[0], pair[1]]);
            native.extend_from_slice(&sample.to_ne_bytes());
        }
        save_png(path, spec, &native, image::ExtendedColorType::L16)
    } else {
        save_png(path, spec, image, image::ExtendedColorType::L8)
    }
}

fn save_png(
    path: &Path,
    spec: &RenderSpec,
    buf: &[u8],
    color: image::ExtendedColorType,
) -> MandelpixResult<()> {
    image::save_buffer_with_format(
        path,
        buf,
        spec.width,
        spec.height,
        color,
        image::ImageFormat::Png,
    )
    .map_err(|e| {
        MandelpixError::Other(anyhow::anyhow!("write png '{}': {e}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_byte_samples() {
        let mut row = [0u8; 4];
        write_sample(&mut row, 2, 1, 200);
        assert_eq!(row, [0, 0, 200, 0]);
        assert_eq!(read_sample(&row, 2, 1), 200);
    }

    #[test]
    fn two_byte_samples_are_big_endian() {
        let mut row = [0u8; 8];
        write_sample(&mut row, 1, 2, 0x1234);
        assert_eq!(row, [0, 0, 0x12, 0x34, 0, 0, 0, 0]);
        assert_eq!(read_sample(&row, 1, 2), 0x1234);
    }

    #[test]
    fn pgm_header_and_payload() {
        let spec = RenderSpec::new(3, 2, 10, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let payload = [0u8, 1, 2, 3, 4, 5];
        let mut out = Vec::new();
        write_pgm(&mut out, &spec, &payload).unwrap();
        assert_eq!(&out[..9], b"P5\n3 2\n9\n");
        assert_eq!(&out[9..], &payload);
    }

    #[test]
    fn pgm_wide_maxval() {
        let spec = RenderSpec::new(1, 1, 300, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let mut out = Vec::new();
        write_pgm(&mut out, &spec, &[0x01, 0x2A]).unwrap();
        assert_eq!(&out, b"P5\n1 1\n299\n\x01\x2A");
    }

    #[test]
    fn png_l16_roundtrips_through_image_crate() {
        let dir = std::path::PathBuf::from("target").join("encode_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("l16.png");

        let spec = RenderSpec::new(4, 1, 300, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let mut buf = vec![0u8; spec.buffer_len()];
        for (i, v) in [0u32, 1, 258, 299].into_iter().enumerate() {
            write_sample(&mut buf, i, 2, v);
        }
        write_png(&path, &spec, &buf).unwrap();

        let decoded = image::open(&path).unwrap().into_luma16();
        assert_eq!(decoded.get_pixel(0, 0).0[0], 0);
        assert_eq!(decoded.get_pixel(2, 0).0[0], 258);
        assert_eq!(decoded.get_pixel(3, 0).0[0], 299);
    }
}
