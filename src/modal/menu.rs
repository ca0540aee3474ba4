use super::run_modal;
use crate::input::{HandlerTable, KeyDispatcher, LogicalKey, Step};
use crate::render::Screen;
use anyhow::Result;

/// Cursor over `len` items. Moving past either end wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    len: usize,
    cursor: usize,
}

impl MenuState {
    pub fn new(len: usize) -> Self {
        Self { len, cursor: 0 }
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
}

/// Single-choice menu. `Some(index)` on Return, `None` on Escape or an empty list.
pub fn menu_select<F>(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    len: usize,
    mut render: F,
) -> Result<Option<usize>>
where
    F: FnMut(&MenuState) -> String,
{
    if len == 0 {
        return Ok(None);
    }
    let mut state = MenuState::new(len);
    let mut table = HandlerTable::new();
    table
        .on(LogicalKey::Up, |menu: &mut MenuState| {
            menu.move_up();
            Step::Redraw
        })
        .on(LogicalKey::Down, |menu: &mut MenuState| {
            menu.move_down();
            Step::Redraw
        })
        .on(LogicalKey::Return, |menu: &mut MenuState| {
            Step::Settle(Some(menu.cursor()))
        })
        .on(LogicalKey::Escape, |_| Step::Settle(None));
    run_modal(keys, screen, &mut table, &mut state, &mut render)
}
