//! POSIX daemonization: double-fork, detach from the controlling terminal, and
//! guard against a second instance via a PID file.
//!
//! Must run before the Tokio runtime starts — `fork()` after threads exist only
//! leaves the calling thread alive in the child, which would silently wedge
//! the runtime.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{Error, Result};

fn pid_file_path(app_name: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/{app_name}.pid"))
}

fn process_is_alive(pid: libc::pid_t) -> bool {
    // kill(pid, 0) checks existence/permission without sending a signal.
    unsafe { libc::kill(pid, 0) == 0 }
}

fn check_pid_file(app_name: &str) -> Result<()> {
    let path = pid_file_path(app_name);
    let existing = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::Io(e)),
    };

    if let Ok(pid) = existing.trim().parse::<libc::pid_t>() {
        if process_is_alive(pid) {
            return Err(Error::Conflict(format!("another instance is already running (pid {pid}, {})", path.display())));
        }
    }

    Ok(())
}

fn write_pid_file(app_name: &str) -> Result<()> {
    let path = pid_file_path(app_name);
    let pid = unsafe { libc::getpid() };
    fs::write(path, format!("{pid}\n"))?;
    Ok(())
}

/// Forks into the background, becomes a session leader, detaches stdio, and
/// writes a PID file. The parent process exits 0 immediately after a
/// successful first fork; only the final grandchild returns from this function.
pub fn daemonize(app_name: &str) -> Result<()> {
    check_pid_file(app_name)?;

    unsafe {
        match libc::fork() {
            -1 => return Err(Error::Io(io::Error::last_os_error())),
            0 => {} // first child continues below
            _ => std::process::exit(0), // original parent
        }

        if libc::setsid() == -1 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        match libc::fork() {
            -1 => return Err(Error::Io(io::Error::last_os_error())),
            0 => {} // second child (the daemon) continues below
            _ => std::process::exit(0), // first child
        }

        libc::umask(0);

        let root = std::ffi::CString::new("/").expect("no interior nul");
        if libc::chdir(root.as_ptr()) == -1 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        let devnull = std::ffi::CString::new("/dev/null").expect("no interior nul");
        let devnull_fd = libc::open(devnull.as_ptr(), libc::O_RDWR);
        if devnull_fd >= 0 {
            libc::dup2(devnull_fd, libc::STDIN_FILENO);
            libc::dup2(devnull_fd, libc::STDOUT_FILENO);
            libc::dup2(devnull_fd, libc::STDERR_FILENO);
            if devnull_fd > libc::STDERR_FILENO {
                libc::close(devnull_fd);
            }
        }
    }

    write_pid_file(app_name)?;
    Ok(())
}
