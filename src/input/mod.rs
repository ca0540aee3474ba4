//! Key Input Dispatcher: physical keys in, logical events out.
//!
//! Navigation mode looks keys up in the active [`HandlerTable`]; text mode
//! captures printable keys into a line buffer instead. Ctrl+C bypasses both.

mod dispatcher;
mod event;
mod interrupt;
mod spawn;

pub use dispatcher::{Dispatched, HandlerTable, KeyDispatcher, Step, TextEditState};
pub use event::{KeyInput, LogicalKey};
pub use interrupt::{
    active_child, clear_active_child, handle_interrupt, set_active_child, terminate_active_child,
};
#[cfg(test)]
pub(crate) use interrupt::CHILD_SLOT_TEST_LOCK;
pub use spawn::{forward_keys, spawn_input_thread, ForwardStop, INPUT_CHANNEL_CAPACITY};

use crossbeam_channel::{bounded, Sender};

/// A dispatcher fed from an in-process channel, for scripted input.
pub fn scripted_dispatcher() -> (Sender<KeyInput>, KeyDispatcher) {
    let (tx, rx) = bounded(INPUT_CHANNEL_CAPACITY);
    (tx, KeyDispatcher::new(rx))
}
