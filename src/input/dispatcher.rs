use super::event::{KeyInput, LogicalKey};
use anyhow::{anyhow, Result};
use crossbeam_channel::Receiver;
use std::collections::HashMap;

/// What a handler asks the active primitive to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<R> {
    /// State changed; draw a fresh frame.
    Redraw,
    /// The primitive is finished with this result.
    Settle(R),
    /// Nothing visible changed.
    Stay,
}

type Handler<S, R> = Box<dyn FnMut(&mut S) -> Step<R>>;

/// One callback per logical key, owned by whichever primitive is running.
pub struct HandlerTable<S, R> {
    handlers: HashMap<LogicalKey, Handler<S, R>>,
}

impl<S, R> HandlerTable<S, R> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any earlier binding for it.
    pub fn on<F>(&mut self, key: LogicalKey, handler: F) -> &mut Self
    where
        F: FnMut(&mut S) -> Step<R> + 'static,
    {
        self.handlers.insert(key, Box::new(handler));
        self
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn invoke(&mut self, key: LogicalKey, state: &mut S) -> Option<Step<R>> {
        self.handlers.get_mut(&key).map(|handler| handler(state))
    }
}

impl<S, R> Default for HandlerTable<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Line-editor state while a text primitive holds the keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditState {
    pub buffer: String,
    pub active: bool,
}

/// Outcome of feeding one key to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched<R> {
    Ignored,
    Redraw,
    Settled(R),
    /// Text mode ended with Return; carries the untrimmed buffer.
    Submitted(String),
}

/// Routes keystrokes either into the text buffer or through the active handler table.
pub struct KeyDispatcher {
    rx: Receiver<KeyInput>,
    text: TextEditState,
}

impl KeyDispatcher {
    pub fn new(rx: Receiver<KeyInput>) -> Self {
        Self {
            rx,
            text: TextEditState::default(),
        }
    }

    /// Switch to text mode with the buffer seeded from `initial`.
    pub fn start_text_input(&mut self, initial: &str) {
        self.text.buffer.clear();
        self.text.buffer.push_str(initial);
        self.text.active = true;
    }

    pub fn stop_text_input(&mut self) {
        self.text.active = false;
    }

    pub fn text_active(&self) -> bool {
        self.text.active
    }

    pub fn text_buffer(&self) -> &str {
        &self.text.buffer
    }

    /// Block until the next keystroke arrives.
    pub fn next_key(&self) -> Result<KeyInput> {
        self.rx
            .recv()
            .map_err(|_| anyhow!("keyboard input closed"))
    }

    /// Drop keystrokes typed while nothing was listening (e.g. during a download).
    pub fn discard_pending(&self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            crate::log_debug(&format!("discarded {dropped} buffered keystrokes"));
        }
        dropped
    }

    pub fn dispatch<S, R>(
        &mut self,
        key: KeyInput,
        table: &mut HandlerTable<S, R>,
        state: &mut S,
    ) -> Dispatched<R> {
        if self.text.active {
            return self.dispatch_text(key, table, state);
        }
        match key.logical().and_then(|logical| table.invoke(logical, state)) {
            Some(step) => step.into(),
            None => Dispatched::Ignored,
        }
    }

    fn dispatch_text<S, R>(
        &mut self,
        key: KeyInput,
        table: &mut HandlerTable<S, R>,
        state: &mut S,
    ) -> Dispatched<R> {
        match key {
            KeyInput::Return => {
                self.text.active = false;
                Dispatched::Submitted(self.text.buffer.clone())
            }
            KeyInput::Escape => {
                self.text.active = false;
                self.text.buffer.clear();
                // Cancellation is delivered through the navigation Escape binding.
                match table.invoke(LogicalKey::Escape, state) {
                    Some(step) => step.into(),
                    None => Dispatched::Redraw,
                }
            }
            KeyInput::Backspace => {
                self.text.buffer.pop();
                Dispatched::Redraw
            }
            KeyInput::Space => {
                self.text.buffer.push(' ');
                Dispatched::Redraw
            }
            KeyInput::Char(ch) => {
                self.text.buffer.push(ch);
                Dispatched::Redraw
            }
            KeyInput::Up | KeyInput::Down | KeyInput::Interrupt | KeyInput::Other => {
                Dispatched::Ignored
            }
        }
    }
}

impl<R> From<Step<R>> for Dispatched<R> {
    fn from(step: Step<R>) -> Self {
        match step {
            Step::Redraw => Dispatched::Redraw,
            Step::Settle(result) => Dispatched::Settled(result),
            Step::Stay => Dispatched::Ignored,
        }
    }
}
