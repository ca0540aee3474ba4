use crate::input::{Dispatched, HandlerTable, KeyDispatcher, LogicalKey, Step};
use crate::render::Screen;
use anyhow::Result;

/// Free-text line editor. `Some(raw buffer)` on Return, `None` on Escape.
///
/// `render` sees the live buffer after every keystroke, so callers can show
/// validation feedback as the operator types. Trimming is up to the caller.
pub fn text_input<F>(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    initial: &str,
    mut render: F,
) -> Result<Option<String>>
where
    F: FnMut(&str) -> String,
{
    let mut table: HandlerTable<(), Option<String>> = HandlerTable::new();
    table.on(LogicalKey::Escape, |_| Step::Settle(None));
    keys.start_text_input(initial);
    let result = edit_until_settled(keys, screen, &mut table, &mut render);
    keys.stop_text_input();
    table.clear();
    result
}

fn edit_until_settled(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    table: &mut HandlerTable<(), Option<String>>,
    render: &mut dyn FnMut(&str) -> String,
) -> Result<Option<String>> {
    screen.draw(&render(keys.text_buffer()))?;
    loop {
        let key = keys.next_key()?;
        match keys.dispatch(key, table, &mut ()) {
            Dispatched::Ignored => {}
            Dispatched::Redraw => screen.draw(&render(keys.text_buffer()))?,
            Dispatched::Submitted(buffer) => return Ok(Some(buffer)),
            Dispatched::Settled(result) => return Ok(result),
        }
    }
}
