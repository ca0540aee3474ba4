//! Modal primitives: each one owns the keyboard until it settles exactly once.
//!
//! Every primitive builds a fresh [`HandlerTable`], draws once immediately,
//! redraws after each state-changing key and clears its table before returning.

mod checkbox;
mod menu;
mod prompt;
mod text;

pub use checkbox::{checkbox_select, CheckboxState};
pub use menu::{menu_select, MenuState};
pub use prompt::{acknowledge, prompt_keys};
pub use text::text_input;

use crate::input::{Dispatched, HandlerTable, KeyDispatcher};
use crate::render::Screen;
use anyhow::Result;

/// Drive a navigation-mode primitive until one of its handlers settles.
fn run_modal<S, R>(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    table: &mut HandlerTable<S, R>,
    state: &mut S,
    render: &mut dyn FnMut(&S) -> String,
) -> Result<R> {
    screen.draw(&render(state))?;
    loop {
        let key = keys.next_key()?;
        match keys.dispatch(key, table, state) {
            Dispatched::Ignored | Dispatched::Submitted(_) => {}
            Dispatched::Redraw => screen.draw(&render(state))?,
            Dispatched::Settled(result) => {
                table.clear();
                return Ok(result);
            }
        }
    }
}
