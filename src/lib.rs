pub mod app;
pub mod config;
pub mod doctor;
pub mod flow;
pub mod input;
pub mod modal;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod screens;
pub mod spotify;
pub mod tagging;
pub mod telemetry;
pub mod terminal_restore;
pub mod transfer;

pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
