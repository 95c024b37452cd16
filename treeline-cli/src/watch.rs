//! Stdin-backed abort source for supervised command execution.
//!
//! While a handler runs, the supervisor polls stdin with a bounded
//! timeout. End-of-input (read returning zero) or a Ctrl-D byte in
//! freshly read input triggers the hard abort; anything else typed
//! during execution is read and discarded. Interrupt-style signals are
//! ignored for the whole interactive session so Ctrl-C can never kill
//! the shell mid-command.

use std::time::Duration;
use treeline_core::{AbortPoll, AbortWatch};

/// The EOT byte sent by Ctrl-D.
const CANCEL_BYTE: u8 = 0x04;

/// Polls the process stdin for the hard-abort signal.
///
/// Only the supervisor reads stdin while a handler runs; the handler
/// itself never touches the shared input channel.
pub struct StdinWatch;

impl AbortWatch for StdinWatch {
    fn poll(&mut self, timeout: Duration) -> AbortPoll {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
        let ret = unsafe { libc::poll(&mut pfd, 1, millis) };
        if ret <= 0 {
            // Timeout or transient error: loop again, stay live.
            return AbortPoll::Quiet;
        }

        if pfd.revents & (libc::POLLIN | libc::POLLHUP) != 0 {
            let mut buffer = [0u8; 64];
            let n = unsafe {
                libc::read(
                    libc::STDIN_FILENO,
                    buffer.as_mut_ptr().cast(),
                    buffer.len(),
                )
            };
            if n == 0 {
                // End-of-input: the user closed the channel.
                return AbortPoll::Abort;
            }
            if n > 0 && buffer[..n as usize].contains(&CANCEL_BYTE) {
                return AbortPoll::Abort;
            }
        }
        AbortPoll::Quiet
    }
}

/// Ignore interrupt-style signals for the rest of the session.
///
/// The line editor sees Ctrl-C as a key event in raw mode; with the
/// signals ignored, Ctrl-C during command execution is a no-op instead
/// of process termination. Exit paths are 'exit'/'quit' and Ctrl-D.
pub fn suppress_interactive_signals() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
        libc::signal(libc::SIGQUIT, libc::SIG_IGN);
        libc::signal(libc::SIGTSTP, libc::SIG_IGN);
    }
}
