use crate::error::Result;

/// Pins the harness to `core`. Children spawned afterwards inherit the mask,
/// so every compressor under test runs on the same core.
#[cfg(target_os = "linux")]
pub fn pin_to_core(core: usize) -> Result<()> {
    use crate::error::HarnessError;
    use std::mem::MaybeUninit;

    if core >= libc::CPU_SETSIZE as usize {
        return Err(HarnessError::Affinity {
            core,
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        });
    }

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(core, set_ref);

        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref) == 0 {
            Ok(())
        } else {
            Err(HarnessError::Affinity { core, source: std::io::Error::last_os_error() })
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_core(core: usize) -> Result<()> {
    tracing::warn!("CPU pinning is not supported on this platform, ignoring core {}", core);
    Ok(())
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    #[test]
    fn test_out_of_range_core() {
        assert!(matches!(pin_to_core(1 << 20), Err(HarnessError::Affinity { .. })));
    }
}
