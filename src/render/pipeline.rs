//! High-level render entry point: validate, select, allocate, fill.

use crate::foundation::core::RenderSpec;
use crate::foundation::error::{MandelpixError, MandelpixResult};
use crate::render::backend::{BackendPrefs, select_backend};

/// Threading options for one render call.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderThreading {
    /// Override the number of rayon worker threads. `None` uses the global pool.
    pub threads: Option<usize>,
}

/// Render `spec` into a freshly allocated buffer.
///
/// Convenience wrapper over the backend contract: validates the spec, selects a backend per
/// `prefs`, sizes the buffer, and fills it. Callers that manage their own buffers can use
/// [`crate::RenderBackend::fill`] directly.
#[tracing::instrument(skip_all, fields(width = spec.width, height = spec.height, iterations = spec.iterations))]
pub fn render_image(
    spec: &RenderSpec,
    prefs: &BackendPrefs,
    threading: &RenderThreading,
) -> MandelpixResult<Vec<u8>> {
    spec.validate()?;
    let backend = select_backend(prefs)?;
    tracing::debug!(backend = backend.kind().name(), "render backend selected");

    let mut image = vec![0u8; spec.buffer_len()];
    match threading.threads {
        Some(0) => {
            return Err(MandelpixError::validation("thread count must be at least 1"));
        }
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| MandelpixError::backend(format!("worker pool setup failed: {e}")))?;
            pool.install(|| backend.fill(spec, &mut image));
        }
        None => backend.fill(spec, &mut image),
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_into_a_correctly_sized_buffer() {
        let spec = RenderSpec::new(16, 8, 32, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let image =
            render_image(&spec, &BackendPrefs::default(), &RenderThreading::default()).unwrap();
        assert_eq!(image.len(), spec.buffer_len());
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let spec = RenderSpec::new(24, 16, 64, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        let prefs = BackendPrefs::default();
        let global = render_image(&spec, &prefs, &RenderThreading::default()).unwrap();
        let pooled =
            render_image(&spec, &prefs, &RenderThreading { threads: Some(2) }).unwrap();
        assert_eq!(global, pooled);
    }

    #[test]
    fn rejects_invalid_specs_before_selecting() {
        let bad = RenderSpec {
            width: 0,
            ..RenderSpec::default()
        };
        assert!(matches!(
            render_image(&bad, &BackendPrefs::default(), &RenderThreading::default()),
            Err(MandelpixError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_worker_threads() {
        let spec = RenderSpec::new(4, 4, 8, [-2.5, 1.5], [-1.5, 1.5]).unwrap();
        assert!(
            render_image(
                &spec,
                &BackendPrefs::default(),
                &RenderThreading { threads: Some(0) }
            )
            .is_err()
        );
    }
}
