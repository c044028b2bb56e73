//! Runtime CPU-capability detection.
//!
//! Detection is a runtime query against the processor, distinct from the compile-time
//! `target_arch` gates that decide which backends exist at all. The result is computed once
//! and treated as read-only configuration for the rest of the process.

use std::sync::OnceLock;

/// Vector capabilities of the running CPU.
///
/// Fields for foreign architectures are present but always `false`, so the struct reads the
/// same everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuCaps {
    /// 256-bit AVX float support (x86_64).
    pub avx: bool,
    /// 128-bit SSE2 float support (x86_64).
    pub sse2: bool,
    /// 128-bit NEON float support (aarch64).
    pub neon: bool,
}

impl CpuCaps {
    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                avx: is_x86_feature_detected!("avx"),
                sse2: is_x86_feature_detected!("sse2"),
                neon: false,
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self {
                avx: false,
                sse2: false,
                neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::default()
        }
    }
}

/// Capabilities of the running CPU, detected on first use and cached for the process lifetime.
pub fn cpu_caps() -> CpuCaps {
    static CAPS: OnceLock<CpuCaps> = OnceLock::new();
    *CAPS.get_or_init(CpuCaps::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_stable() {
        assert_eq!(cpu_caps(), cpu_caps());
    }

    #[test]
    fn foreign_features_stay_off() {
        let caps = cpu_caps();
        #[cfg(target_arch = "x86_64")]
        assert!(!caps.neon);
        #[cfg(target_arch = "aarch64")]
        {
            assert!(!caps.avx);
            assert!(!caps.sse2);
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        assert_eq!(caps, CpuCaps::default());
    }
}
