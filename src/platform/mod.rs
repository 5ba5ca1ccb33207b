//! Native platform boundary: the support gate, the privilege query for the
//! banner, and the concrete providers behind the sampling traits.

#[cfg(windows)]
pub mod windows;

use crate::error::ProbeError;
use crate::metrics::{MemoryProbe, TimeCounterSource};

/// Privilege level reported in the startup banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Administrator,
    User,
    Unknown,
}

/// Native implementations of the sampling traits.
pub struct NativeProviders {
    pub time_counters: Box<dyn TimeCounterSource>,
    pub memory: Box<dyn MemoryProbe>,
}

/// Builds the native providers, or reports that the host lacks the required
/// APIs. Called once at startup, before any sampling.
pub fn native_providers() -> Result<NativeProviders, ProbeError> {
    #[cfg(windows)]
    {
        Ok(NativeProviders {
            time_counters: Box::new(windows::SystemTimesSampler),
            memory: Box::new(windows::GlobalMemoryProbe),
        })
    }
    #[cfg(not(windows))]
    {
        Err(ProbeError::UnsupportedPlatform)
    }
}

/// Privilege level of the current process, best effort.
pub fn privilege_level() -> Privilege {
    #[cfg(windows)]
    {
        windows::privilege_level()
    }
    #[cfg(not(windows))]
    {
        Privilege::Unknown
    }
}
