use super::{error_frame, heading, hints, success_frame, Ui};
use crate::config::{ConfigStore, UserConfig};
use crate::log_debug;
use crate::modal::{menu_select, text_input, MenuState};
use crate::render::Palette;
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    DownloadDir,
    ResetCredentials,
    Back,
}

const ITEMS: [SettingsItem; 3] = [
    SettingsItem::DownloadDir,
    SettingsItem::ResetCredentials,
    SettingsItem::Back,
];

fn item_label(palette: &Palette, item: SettingsItem, config: &UserConfig) -> String {
    match item {
        SettingsItem::DownloadDir => format!(
            "Download directory: {}",
            palette.paint(palette.accent, &config.download_dir.display().to_string())
        ),
        SettingsItem::ResetCredentials => "Reset Spotify credentials".to_string(),
        SettingsItem::Back => "Back".to_string(),
    }
}

fn settings_frame(palette: &Palette, config: &UserConfig, menu: &MenuState) -> String {
    let mut lines = vec![String::new(), heading(palette, "Settings"), String::new()];
    for (index, item) in ITEMS.iter().enumerate() {
        let label = item_label(palette, *item, config);
        if index == menu.cursor() {
            lines.push(format!(
                "  {} {}",
                palette.paint(palette.accent, "❯"),
                palette.paint(palette.bold, &label)
            ));
        } else {
            lines.push(format!("    {label}"));
        }
    }
    lines.push(String::new());
    lines.push(hints(
        palette,
        &[("↑/↓", "navigate"), ("Enter", "select"), ("Esc", "back")],
    ));
    lines.join("\n")
}

fn download_dir_frame(palette: &Palette, current: &str, text: &str) -> String {
    [
        String::new(),
        heading(palette, "Set download directory:"),
        String::new(),
        format!("  > {text}{}", palette.paint(palette.dim, "█")),
        String::new(),
        format!("  {}", palette.paint(palette.dim, &format!("Current: {current}"))),
        hints(palette, &[("Enter", "save"), ("Esc", "cancel")]),
    ]
    .join("\n")
}

/// One pass through the settings menu. Changes are written to `store` immediately.
pub fn show_settings(ui: &mut Ui<'_>, store: &ConfigStore, config: &mut UserConfig) -> Result<()> {
    let palette = ui.palette;
    let picked = {
        let snapshot = &*config;
        menu_select(ui.keys, ui.screen, ITEMS.len(), |menu| {
            settings_frame(&palette, snapshot, menu)
        })?
    };
    let Some(item) = picked.and_then(|index| ITEMS.get(index).copied()) else {
        return Ok(());
    };

    match item {
        SettingsItem::Back => Ok(()),
        SettingsItem::DownloadDir => {
            let current = config.download_dir.display().to_string();
            let entered = text_input(ui.keys, ui.screen, &current, |text| {
                download_dir_frame(&palette, &current, text)
            })?;
            let Some(dir) = entered.map(|dir| dir.trim().to_string()).filter(|dir| !dir.is_empty())
            else {
                return Ok(());
            };
            config.download_dir = PathBuf::from(dir);
            save_and_confirm(ui, store, config, "Download directory updated!")
        }
        SettingsItem::ResetCredentials => {
            config.clear_credentials();
            save_and_confirm(
                ui,
                store,
                config,
                "Credentials cleared. You'll be prompted on next run.",
            )
        }
    }
}

fn save_and_confirm(
    ui: &mut Ui<'_>,
    store: &ConfigStore,
    config: &UserConfig,
    confirmation: &str,
) -> Result<()> {
    let palette = ui.palette;
    match store.save(config) {
        Ok(()) => ui.notice(&success_frame(&palette, confirmation)),
        Err(err) => {
            log_debug(&format!("settings save failed: {err}"));
            let headline = format!("Could not save settings: {err}");
            ui.acknowledge(&error_frame(&palette, &headline, &[]))
        }
    }
}
