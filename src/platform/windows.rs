//! Win32 implementations of the sampling traits.
//!
//! The status structures are fixed-layout `#[repr(C)]` records matching the
//! documented field order of the native calls; nothing is rebuilt per call.

use std::io;
use std::mem;

use super::Privilege;
use crate::error::ProbeError;
use crate::metrics::{MemoryProbe, RawMemoryStatus, TimeCounterSample, TimeCounterSource};

/// 64-bit time value split into two 32-bit halves, as the system time call
/// reports it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FileTime {
    low: u32,
    high: u32,
}

impl FileTime {
    fn as_u64(self) -> u64 {
        (self.high as u64) << 32 | self.low as u64
    }
}

/// Extended memory status block. `length` must carry the structure size
/// before the call.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct MemoryStatusEx {
    length: u32,
    /// OS-computed physical-memory load, 0-100.
    memory_load: u32,
    total_phys: u64,
    avail_phys: u64,
    total_page_file: u64,
    avail_page_file: u64,
    total_virtual: u64,
    avail_virtual: u64,
    avail_extended_virtual: u64,
}

/// Legacy memory status block: same leading fields, platform-word totals,
/// no size-tag requirement on the call itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct MemoryStatus {
    length: u32,
    memory_load: u32,
    total_phys: usize,
    avail_phys: usize,
    total_page_file: usize,
    avail_page_file: usize,
    total_virtual: usize,
    avail_virtual: usize,
}

#[link(name = "kernel32")]
extern "system" {
    fn GetSystemTimes(idle: *mut FileTime, kernel: *mut FileTime, user: *mut FileTime) -> i32;
    fn GlobalMemoryStatusEx(status: *mut MemoryStatusEx) -> i32;
    fn GlobalMemoryStatus(status: *mut MemoryStatus);
}

#[link(name = "shell32")]
extern "system" {
    fn IsUserAnAdmin() -> i32;
}

/// Captures the cumulative idle/kernel/user counters in one call.
pub struct SystemTimesSampler;

impl TimeCounterSource for SystemTimesSampler {
    fn sample(&self) -> Result<TimeCounterSample, ProbeError> {
        let mut idle = FileTime::default();
        let mut kernel = FileTime::default();
        let mut user = FileTime::default();

        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(ProbeError::TimeCounterQuery(io::Error::last_os_error()));
        }

        Ok(TimeCounterSample {
            idle: idle.as_u64(),
            kernel: kernel.as_u64(),
            user: user.as_u64(),
        })
    }
}

/// Two-tier native memory probe.
pub struct GlobalMemoryProbe;

impl MemoryProbe for GlobalMemoryProbe {
    fn query_extended(&self) -> Result<RawMemoryStatus, ProbeError> {
        let mut status = MemoryStatusEx {
            length: mem::size_of::<MemoryStatusEx>() as u32,
            ..MemoryStatusEx::default()
        };

        let ok = unsafe { GlobalMemoryStatusEx(&mut status) };
        if ok == 0 {
            return Err(ProbeError::ExtendedMemoryQuery(io::Error::last_os_error()));
        }

        Ok(RawMemoryStatus {
            load_percent: status.memory_load,
            total_bytes: status.total_phys,
            avail_bytes: status.avail_phys,
        })
    }

    fn query_legacy(&self) -> Result<RawMemoryStatus, ProbeError> {
        let mut status = MemoryStatus {
            length: mem::size_of::<MemoryStatus>() as u32,
            ..MemoryStatus::default()
        };

        // The legacy call reports through the structure and has no failure
        // return.
        unsafe { GlobalMemoryStatus(&mut status) };

        Ok(RawMemoryStatus {
            load_percent: status.memory_load,
            total_bytes: status.total_phys as u64,
            avail_bytes: status.avail_phys as u64,
        })
    }
}

/// Whether the process runs elevated, per the shell privilege check.
pub(super) fn privilege_level() -> Privilege {
    match unsafe { IsUserAnAdmin() } {
        0 => Privilege::User,
        _ => Privilege::Administrator,
    }
}
