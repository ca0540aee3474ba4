use crate::log_debug;
use crate::terminal_restore::restore_terminal;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};

// 0 means no subprocess is running.
static ACTIVE_CHILD: AtomicU32 = AtomicU32::new(0);

/// Serializes tests that touch the process-wide child slot.
#[cfg(test)]
pub(crate) static CHILD_SLOT_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Record the pid of the downloader subprocess so an interrupt can stop it.
pub fn set_active_child(pid: u32) {
    ACTIVE_CHILD.store(pid, Ordering::SeqCst);
}

pub fn clear_active_child() {
    ACTIVE_CHILD.store(0, Ordering::SeqCst);
}

pub fn active_child() -> Option<u32> {
    match ACTIVE_CHILD.load(Ordering::SeqCst) {
        0 => None,
        pid => Some(pid),
    }
}

/// Send SIGTERM to the running subprocess, if any. Returns true when a signal was delivered.
pub fn terminate_active_child() -> bool {
    let Some(pid) = active_child() else {
        return false;
    };
    #[cfg(unix)]
    unsafe {
        if libc::kill(pid as i32, libc::SIGTERM) != 0 {
            log_debug(&format!(
                "failed to send SIGTERM to pid {pid}: {}",
                io::Error::last_os_error()
            ));
            return false;
        }
        true
    }
    #[cfg(not(unix))]
    {
        log_debug(&format!("interrupt: cannot signal pid {pid} on this platform"));
        false
    }
}

/// Ctrl+C: stop the subprocess, release the terminal, and exit cleanly.
pub fn handle_interrupt() -> ! {
    log_debug("interrupt received; exiting");
    terminate_active_child();
    restore_terminal();
    let mut stdout = io::stdout();
    let _ = writeln!(stdout);
    let _ = stdout.flush();
    std::process::exit(0);
}
