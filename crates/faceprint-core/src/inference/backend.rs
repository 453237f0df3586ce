//! Compute backend selection for inference.

use candle_core::Device;
use tracing::{debug, info};

/// Thread count for the CPU fallback pool.
pub const CPU_THREADS: usize = 4;

/// The compute backend a session runs on.
///
/// Resolved once at load time by [`Backend::select`] and fixed for the
/// lifetime of the session.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Hardware-accelerated execution (Metal on macOS, CUDA elsewhere).
    Accelerated(Device),
    /// Multi-threaded CPU execution with a bounded pool.
    ThreadedCpu {
        /// Number of worker threads.
        threads: usize,
    },
}

impl Backend {
    /// Probes for a hardware-accelerated device, falling back to a
    /// [`CPU_THREADS`]-sized CPU pool.
    #[must_use]
    pub fn select() -> Self {
        #[cfg(feature = "metal")]
        {
            match Device::new_metal(0) {
                Ok(device) => {
                    info!("Using Metal backend for inference");
                    return Self::Accelerated(device);
                }
                Err(e) => debug!("Metal unavailable: {e}"),
            }
        }

        #[cfg(feature = "cuda")]
        {
            match Device::new_cuda(0) {
                Ok(device) => {
                    info!("Using CUDA backend for inference");
                    return Self::Accelerated(device);
                }
                Err(e) => debug!("CUDA unavailable: {e}"),
            }
        }

        Self::threaded_cpu()
    }

    /// Builds the CPU backend, configuring the global worker pool.
    #[must_use]
    pub fn threaded_cpu() -> Self {
        // candle runs CPU kernels on the global rayon pool; bounding it is
        // only possible before first use, so a failure here just means the
        // pool was already configured.
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(CPU_THREADS)
            .build_global()
        {
            debug!("Thread pool already configured: {e}");
        }
        info!("Using CPU backend with {CPU_THREADS} threads");
        Self::ThreadedCpu {
            threads: CPU_THREADS,
        }
    }

    /// Returns the candle device for this backend.
    #[must_use]
    pub fn device(&self) -> Device {
        match self {
            Self::Accelerated(device) => device.clone(),
            Self::ThreadedCpu { .. } => Device::Cpu,
        }
    }

    /// Returns true when running on a hardware-accelerated device.
    #[must_use]
    pub const fn is_accelerated(&self) -> bool {
        matches!(self, Self::Accelerated(_))
    }

    /// Short human-readable backend name for logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accelerated(_) => "accelerated",
            Self::ThreadedCpu { .. } => "threaded-cpu",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_returns_a_backend() {
        // Must not panic regardless of available hardware.
        let backend = Backend::select();
        let _device = backend.device();
    }

    #[test]
    fn test_threaded_cpu_records_thread_count() {
        let backend = Backend::threaded_cpu();
        assert!(!backend.is_accelerated());
        assert_eq!(backend.name(), "threaded-cpu");
        match backend {
            Backend::ThreadedCpu { threads } => assert_eq!(threads, CPU_THREADS),
            Backend::Accelerated(_) => panic!("expected CPU backend"),
        }
    }

    #[test]
    fn test_threaded_cpu_is_idempotent() {
        // The global pool can only be built once; a second call must not panic.
        let _first = Backend::threaded_cpu();
        let _second = Backend::threaded_cpu();
    }
}
