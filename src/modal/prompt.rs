use super::run_modal;
use crate::input::{HandlerTable, KeyDispatcher, LogicalKey, Step};
use crate::render::Screen;
use anyhow::Result;

/// Show a fixed frame and settle with the value bound to whichever key is pressed first.
pub fn prompt_keys<R>(
    keys: &mut KeyDispatcher,
    screen: &mut dyn Screen,
    frame: &str,
    bindings: &[(LogicalKey, R)],
) -> Result<R>
where
    R: Clone + 'static,
{
    let mut table = HandlerTable::new();
    for (key, value) in bindings {
        let value = value.clone();
        table.on(*key, move |_: &mut ()| Step::Settle(value.clone()));
    }
    run_modal(keys, screen, &mut table, &mut (), &mut |_| frame.to_string())
}

/// Message screen dismissed with Enter or Esc.
pub fn acknowledge(keys: &mut KeyDispatcher, screen: &mut dyn Screen, frame: &str) -> Result<()> {
    prompt_keys(
        keys,
        screen,
        frame,
        &[(LogicalKey::Return, ()), (LogicalKey::Escape, ())],
    )
}
