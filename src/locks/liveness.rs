//! Best-effort process liveness probing.

/// Answers whether a process id currently belongs to a running process.
///
/// Implementations must err on the side of "alive": a probe that cannot
/// decide has to return `true`, otherwise an active lock could be reclaimed.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
}

impl<F> ProcessProbe for F
where
    F: Fn(u32) -> bool + Send + Sync,
{
    fn is_alive(&self, pid: u32) -> bool {
        self(pid)
    }
}

/// Probe backed by the operating system.
///
/// On Unix this sends signal 0 to the pid. Elsewhere every pid is reported
/// alive, leaving staleness to the age threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    fn is_alive(&self, pid: u32) -> bool {
        pid_is_alive(pid)
    }
}

#[cfg(unix)]
fn pid_is_alive(pid: u32) -> bool {
    // pid 0 addresses the whole process group
    if pid == 0 {
        return true;
    }
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return true;
    };

    // SAFETY: kill with signal 0 performs only the existence and permission
    // checks; no signal is delivered.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }

    // EPERM: exists but owned by someone else. Anything but ESRCH is undecided.
    std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn pid_is_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_alive() {
        assert!(SystemProbe.is_alive(std::process::id()));
    }

    #[test]
    fn pid_zero_is_treated_as_alive() {
        assert!(SystemProbe.is_alive(0));
    }

    #[cfg(unix)]
    #[test]
    fn reaped_child_is_not_alive() {
        let mut child = std::process::Command::new("true")
            .spawn()
            .expect("failed to spawn `true`");
        let pid = child.id();
        child.wait().expect("failed to wait for child");

        assert!(!SystemProbe.is_alive(pid));
    }

    #[cfg(unix)]
    #[test]
    fn out_of_range_pid_is_treated_as_alive() {
        assert!(SystemProbe.is_alive(u32::MAX));
    }

    #[test]
    fn closures_are_probes() {
        let dead = |_pid: u32| false;
        assert!(!dead.is_alive(42));
    }
}
