pub mod batch_log;
pub mod config;
pub mod logger;
pub mod settings_file;
pub mod tempfiles;

pub use batch_log::BatchLog;
pub use config::*;
pub use logger::{Colors, setup_logging};
pub use settings_file::{CliSettings, SettingsFile, apply_file_to_settings, load_settings_file};
pub use tempfiles::{partial_path_for, remove_partial, rename_partial_to_final, write_atomically};
