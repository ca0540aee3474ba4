use super::event::KeyInput;
use super::interrupt::handle_interrupt;
use crate::log_debug;
use crossbeam_channel::{Sender, TrySendError};
use crossterm::event::{self, Event};
use std::iter;
use std::thread;

pub const INPUT_CHANNEL_CAPACITY: usize = 256;

/// Why [`forward_keys`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardStop {
    Interrupted,
    /// The dispatcher side of the channel is gone.
    Disconnected,
    /// The key source ran dry.
    Exhausted,
}

/// Push keys into the dispatcher channel without ever blocking.
///
/// Keys arriving while the channel is full are dropped, so an `Interrupt`
/// further along is always seen even when nothing is reading (e.g. mid-download).
pub fn forward_keys(
    keys: impl IntoIterator<Item = KeyInput>,
    tx: &Sender<KeyInput>,
) -> ForwardStop {
    let mut dropped = 0usize;
    for key in keys {
        if key == KeyInput::Interrupt {
            return ForwardStop::Interrupted;
        }
        match tx.try_send(key) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                if dropped == 1 {
                    log_debug("input channel full; dropping keystrokes");
                }
            }
            Err(TrySendError::Disconnected(_)) => return ForwardStop::Disconnected,
        }
    }
    ForwardStop::Exhausted
}

fn terminal_keys() -> impl Iterator<Item = KeyInput> {
    iter::from_fn(|| loop {
        match event::read() {
            Ok(Event::Key(key_event)) => {
                if let Some(key) = KeyInput::from_key_event(&key_event) {
                    return Some(key);
                }
            }
            Ok(_) => {}
            Err(err) => {
                log_debug(&format!("terminal read error: {err}"));
                return None;
            }
        }
    })
}

/// Read terminal key events on a dedicated thread and forward them to the dispatcher.
///
/// Ctrl+C never reaches the channel: it tears the process down from here so it
/// works even while the main thread is blocked on a download.
pub fn spawn_input_thread(tx: Sender<KeyInput>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if forward_keys(terminal_keys(), &tx) == ForwardStop::Interrupted {
            handle_interrupt();
        }
    })
}
