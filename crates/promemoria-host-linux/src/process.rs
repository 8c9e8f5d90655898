//! Process management utilities

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::debug;

use promemoria_host_api::{HostError, HostResult};

/// Managed child process with process group
pub struct ManagedProcess {
    pub child: Child,
    pub pid: u32,
    pub pgid: u32,
}

impl ManagedProcess {
    /// Spawn a new process in its own process group
    pub fn spawn(argv: &[String], capture_stdout: bool) -> HostResult<Self> {
        let Some((program, args)) = argv.split_first() else {
            return Err(HostError::Internal("Empty argv".into()));
        };

        let mut cmd = Command::new(program);
        cmd.args(args);

        // Set environment
        cmd.env_clear();
        // Inherit what desktop helpers need to reach the session
        for var in [
            "PATH",
            "HOME",
            "DISPLAY",
            "WAYLAND_DISPLAY",
            "XDG_RUNTIME_DIR",
            "DBUS_SESSION_BUS_ADDRESS",
            "PULSE_SERVER",
        ] {
            if let Ok(value) = std::env::var(var) {
                cmd.env(var, value);
            }
        }

        if capture_stdout {
            cmd.stdout(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null());
        }
        cmd.stderr(Stdio::null());
        cmd.stdin(Stdio::null());

        // SAFETY: setsid is async-signal-safe and this closure only runs in
        // the forked child before exec
        unsafe {
            cmd.pre_exec(|| {
                // New session, so the child leads its own process group
                nix::unistd::setsid().map_err(std::io::Error::other)?;
                Ok(())
            });
        }

        let child = cmd
            .spawn()
            .map_err(|e| HostError::Driver(format!("Failed to spawn {}: {}", program, e)))?;

        let pid = child.id();
        let pgid = pid; // After setsid, pid == pgid

        debug!(pid = pid, pgid = pgid, program = %program, "Process spawned");

        Ok(Self { child, pid, pgid })
    }

    /// Take the captured stdout pipe
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Send SIGTERM to the process group
    pub fn terminate(&self) -> HostResult<()> {
        self.signal_group(Signal::SIGTERM)
    }

    fn signal_group(&self, sig: Signal) -> HostResult<()> {
        let pgid = Pid::from_raw(-(self.pgid as i32)); // Negative for process group

        match signal::kill(pgid, sig) {
            Ok(()) => {
                debug!(pgid = self.pgid, signal = ?sig, "Signalled process group");
                Ok(())
            }
            // Process already gone
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(HostError::Driver(format!("Failed to send {}: {}", sig, e))),
        }
    }

    /// Check if the process has exited (non-blocking)
    pub fn has_exited(&mut self) -> HostResult<bool> {
        self.child
            .try_wait()
            .map(|status| status.is_some())
            .map_err(|e| HostError::Internal(format!("Wait failed: {}", e)))
    }

    /// Terminate the whole group and reap the child off-thread.
    /// Returns once the signal is delivered.
    pub fn shutdown(mut self) -> HostResult<()> {
        // A reaped leader frees its pgid for reuse
        if self.has_exited()? {
            debug!(pid = self.pid, "Process already exited");
            return Ok(());
        }

        let result = self.terminate();
        std::thread::spawn(move || {
            let _ = self.child.wait();
        });
        result
    }
}

/// Locate an executable on `$PATH`
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return path.is_file().then_some(path);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn spawn_simple_process() {
        let argv = vec!["true".to_string()];

        let mut proc = ManagedProcess::spawn(&argv, false).unwrap();
        let status = proc.child.wait().unwrap();
        assert!(status.success());
        assert!(proc.has_exited().unwrap());
    }

    #[test]
    fn spawn_captures_stdout() {
        let argv = vec!["echo".to_string(), "hello".to_string()];

        let mut proc = ManagedProcess::spawn(&argv, true).unwrap();
        let mut output = String::new();
        proc.take_stdout()
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn shutdown_sleeping_process() {
        let argv = vec!["sleep".to_string(), "60".to_string()];

        let mut proc = ManagedProcess::spawn(&argv, false).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!proc.has_exited().unwrap());

        proc.shutdown().unwrap();
    }

    #[test]
    fn shutdown_after_exit_is_quiet() {
        let argv = vec!["true".to_string()];

        let mut proc = ManagedProcess::spawn(&argv, false).unwrap();
        proc.child.wait().unwrap();
        assert!(proc.shutdown().is_ok());
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(ManagedProcess::spawn(&[], false).is_err());
    }

    #[test]
    fn find_shell() {
        assert!(find_executable("sh").is_some());
        assert!(find_executable("definitely-not-a-real-binary-xyz").is_none());
    }
}
