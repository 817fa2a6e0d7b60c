//! Process liveness checks for session endpoint descriptors.

/// Returns `true` when a process with `pid` appears alive on this host.
pub fn pid_is_alive(pid: u32) -> bool {
	#[cfg(unix)]
	{
		if pid == 0 || pid > i32::MAX as u32 {
			return false;
		}

		// SAFETY: signal 0 performs only the existence and permission check.
		let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
		if rc == 0 {
			return true;
		}
		// EPERM: the process exists but belongs to someone else.
		std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
	}

	#[cfg(not(unix))]
	{
		pid == std::process::id()
	}
}
