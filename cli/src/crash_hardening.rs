//! Keep enrollment session state out of crash dumps.

#[cfg(windows)]
use anyhow::bail;
use anyhow::{Context, Result};
use std::env;
#[cfg(unix)]
use std::io;

const ALLOW_COREDUMPS_ENV: &str = "WHORL_ALLOW_COREDUMPS";

/// Disable core dumps for this process unless `WHORL_ALLOW_COREDUMPS` is truthy.
pub fn apply() -> Result<()> {
    if override_requested(env::var(ALLOW_COREDUMPS_ENV).ok().as_deref()) {
        tracing::warn!(
            env_var = ALLOW_COREDUMPS_ENV,
            "Crash dump hardening disabled by environment override"
        );
        return Ok(());
    }

    disable_dumps().context("failed to apply crash dump hardening")?;
    tracing::info!("Crash dump hardening enabled");
    Ok(())
}

fn override_requested(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

#[cfg(unix)]
fn disable_dumps() -> Result<()> {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, initialized rlimit for the duration of the call.
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
    if rc != 0 {
        return Err(io::Error::last_os_error()).context("setrlimit(RLIMIT_CORE=0) failed");
    }

    #[cfg(target_os = "linux")]
    {
        // SAFETY: PR_SET_DUMPABLE takes plain integer arguments.
        let rc = unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) };
        if rc != 0 {
            return Err(io::Error::last_os_error()).context("prctl(PR_SET_DUMPABLE=0) failed");
        }
    }

    Ok(())
}

#[cfg(windows)]
fn disable_dumps() -> Result<()> {
    use windows_sys::Win32::System::Diagnostics::Debug::{
        SEM_FAILCRITICALERRORS, SEM_NOGPFAULTERRORBOX, SetErrorMode,
    };
    use windows_sys::Win32::System::ErrorReporting::{WER_FAULT_REPORTING_NO_UI, WerSetFlags};

    unsafe {
        let _ = SetErrorMode(SEM_FAILCRITICALERRORS | SEM_NOGPFAULTERRORBOX);
        let hr = WerSetFlags(WER_FAULT_REPORTING_NO_UI);
        if hr < 0 {
            bail!("WerSetFlags failed with HRESULT 0x{:08X}", hr as u32);
        }
    }

    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn disable_dumps() -> Result<()> {
    Ok(())
}
