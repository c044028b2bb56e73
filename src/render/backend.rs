use crate::foundation::core::RenderSpec;
use crate::foundation::error::{MandelpixError, MandelpixResult};
use crate::render::scalar::ScalarBackend;

/// A compute backend that fills a pixel buffer with escape-time samples.
///
/// Implementations are interchangeable: for the same spec they must agree with the scalar
/// reference on every pixel except a negligible fraction sitting within one iteration of the
/// escape boundary, where vector reduction order may legitimately differ.
pub trait RenderBackend: Send + Sync {
    /// The variant this backend implements.
    fn kind(&self) -> BackendKind;

    /// Populate `image` with one escape-time sample per pixel, row-major.
    ///
    /// `image` must be exactly [`RenderSpec::buffer_len`] bytes. That is a documented
    /// precondition rather than a runtime check, to keep the hot path branch-free; a
    /// mis-sized buffer panics on slice indexing in the worst case. Rows are rendered in
    /// parallel on the current rayon pool, each worker writing only the disjoint byte range
    /// of rows it owns, and the call returns only once every row is written.
    fn fill(&self, spec: &RenderSpec, image: &mut [u8]);
}

/// The closed set of backend variants.
///
/// Only variants compiled for the current architecture exist; `Scalar` always does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Portable reference implementation and correctness oracle for the rest.
    Scalar,
    /// 8-lane AVX kernel.
    #[cfg(target_arch = "x86_64")]
    Avx,
    /// 4-lane SSE2 kernel.
    #[cfg(target_arch = "x86_64")]
    Sse2,
    /// 4-lane NEON kernel.
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl BackendKind {
    /// Short lower-case name, as shown in logs and accepted by the CLI.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Scalar => "scalar",
            #[cfg(target_arch = "x86_64")]
            BackendKind::Avx => "avx",
            #[cfg(target_arch = "x86_64")]
            BackendKind::Sse2 => "sse2",
            #[cfg(target_arch = "aarch64")]
            BackendKind::Neon => "neon",
        }
    }

    /// Whether the running CPU can execute this backend.
    pub fn is_supported(self) -> bool {
        match self {
            BackendKind::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            BackendKind::Avx => crate::render::caps::cpu_caps().avx,
            #[cfg(target_arch = "x86_64")]
            BackendKind::Sse2 => crate::render::caps::cpu_caps().sse2,
            #[cfg(target_arch = "aarch64")]
            BackendKind::Neon => crate::render::caps::cpu_caps().neon,
        }
    }
}

/// Per-render backend preferences.
///
/// The enable flags mirror the CLI's per-backend disable options; flags for backends that do
/// not exist on the current architecture are inert.
#[derive(Clone, Copy, Debug)]
pub struct BackendPrefs {
    /// Use exactly this backend, failing if the CPU cannot run it.
    pub force: Option<BackendKind>,
    /// Consider the AVX backend during selection.
    pub use_avx: bool,
    /// Consider the SSE2 backend during selection.
    pub use_sse2: bool,
    /// Consider the NEON backend during selection.
    pub use_neon: bool,
}

impl Default for BackendPrefs {
    fn default() -> Self {
        Self {
            force: None,
            use_avx: true,
            use_sse2: true,
            use_neon: true,
        }
    }
}

/// Create a specific backend, failing when the CPU lacks its vector features.
pub fn create_backend(kind: BackendKind) -> MandelpixResult<Box<dyn RenderBackend>> {
    if !kind.is_supported() {
        return Err(MandelpixError::backend(format!(
            "{} backend requested but this cpu does not support it",
            kind.name()
        )));
    }
    match kind {
        BackendKind::Scalar => Ok(Box::new(ScalarBackend)),
        #[cfg(target_arch = "x86_64")]
        BackendKind::Avx => Ok(Box::new(super::avx::AvxBackend)),
        #[cfg(target_arch = "x86_64")]
        BackendKind::Sse2 => Ok(Box::new(super::sse2::Sse2Backend)),
        #[cfg(target_arch = "aarch64")]
        BackendKind::Neon => Ok(Box::new(super::neon::NeonBackend)),
    }
}

/// Select the widest enabled backend the CPU supports, falling back to scalar.
///
/// Fails only when `prefs.force` names a backend the CPU cannot run; the scalar fallback
/// itself is unconditional.
pub fn select_backend(prefs: &BackendPrefs) -> MandelpixResult<Box<dyn RenderBackend>> {
    if let Some(kind) = prefs.force {
        return create_backend(kind);
    }
    #[cfg(target_arch = "x86_64")]
    {
        let caps = crate::render::caps::cpu_caps();
        if prefs.use_avx && caps.avx {
            return create_backend(BackendKind::Avx);
        }
        if prefs.use_sse2 && caps.sse2 {
            return create_backend(BackendKind::Sse2);
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if prefs.use_neon && crate::render::caps::cpu_caps().neon {
            return create_backend(BackendKind::Neon);
        }
    }
    create_backend(BackendKind::Scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_always_creatable() {
        let backend = create_backend(BackendKind::Scalar).unwrap();
        assert_eq!(backend.kind(), BackendKind::Scalar);
        assert!(BackendKind::Scalar.is_supported());
    }

    #[test]
    fn disabling_everything_selects_scalar() {
        let prefs = BackendPrefs {
            force: None,
            use_avx: false,
            use_sse2: false,
            use_neon: false,
        };
        assert_eq!(select_backend(&prefs).unwrap().kind(), BackendKind::Scalar);
    }

    #[test]
    fn default_selection_yields_a_supported_backend() {
        let backend = select_backend(&BackendPrefs::default()).unwrap();
        assert!(backend.kind().is_supported());
    }

    #[test]
    fn forcing_scalar_overrides_wider_backends() {
        let prefs = BackendPrefs {
            force: Some(BackendKind::Scalar),
            ..BackendPrefs::default()
        };
        assert_eq!(select_backend(&prefs).unwrap().kind(), BackendKind::Scalar);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn selection_prefers_wider_vectors() {
        let caps = crate::render::caps::cpu_caps();
        let kind = select_backend(&BackendPrefs::default()).unwrap().kind();
        if caps.avx {
            assert_eq!(kind, BackendKind::Avx);
        } else if caps.sse2 {
            assert_eq!(kind, BackendKind::Sse2);
        } else {
            assert_eq!(kind, BackendKind::Scalar);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn forcing_an_unsupported_backend_fails() {
        if !crate::render::caps::cpu_caps().avx {
            assert!(create_backend(BackendKind::Avx).is_err());
        }
    }
}
