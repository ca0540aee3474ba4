use super::run_modal;
use crate::input::{HandlerTable, KeyDispatcher, LogicalKey, Step};
use crate::render::Screen;
use anyhow::Result;
use std::collections::BTreeSet;

/// Cursor plus checked set. Starts with every item checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxState {
    len: usize,
    cursor: usize,
    checked: BTreeSet<usize>,
}

impl CheckboxState {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            cursor: 0,
            checked: (0..len).collect(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn checked(&self) -> &BTreeSet<usize> {
        &self.checked
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.contains(&index)
    }

    pub fn move_up(&mut self) {
        if self.cursor == 0 {
            self.cursor = self.len.saturating_sub(1);
        } else {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % self.len;
    }

    pub fn toggle_current(&mut self) {
        if self.len == 0 {
            return;
        }
        if !self.checked.remove(&self.cursor) {
            self.checked.insert(self.cursor);
        }
    }

    /// Full set becomes empty; anything else becomes full.
    pub fn toggle_all(&mut self) {
        if self.checked.len() == self.len {
            self.checked.clear();
        } else {
            self.checked = (0..self.len).collect();
        }
    }
}

/// Multi-choice list. `Some(set)` on Return (possibly empty), `None` on Escape.
pub fn checkbox_select<F>(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    len: usize,
    mut render: F,
) -> Result<Option<BTreeSet<usize>>>
where
    F: FnMut(&CheckboxState) -> String,
{
    let mut state = CheckboxState::new(len);
    let mut table = HandlerTable::new();
    table
        .on(LogicalKey::Up, |list: &mut CheckboxState| {
            list.move_up();
            Step::Redraw
        })
        .on(LogicalKey::Down, |list: &mut CheckboxState| {
            list.move_down();
            Step::Redraw
        })
        .on(LogicalKey::Space, |list: &mut CheckboxState| {
            list.toggle_current();
            Step::Redraw
        })
        .on(LogicalKey::Return, |list: &mut CheckboxState| {
            Step::Settle(Some(list.checked().clone()))
        })
        .on(LogicalKey::Escape, |_| Step::Settle(None));
    for letter in ['a', 'A'] {
        table.on(LogicalKey::Letter(letter), |list: &mut CheckboxState| {
            list.toggle_all();
            Step::Redraw
        });
    }
    run_modal(keys, screen, &mut table, &mut state, &mut render)
}
