mod config;
pub mod database;

pub use config::{Config, NotificationsConfig};
pub use database::{CheckRecord, Database};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// - `GOSLEEP_DATA_DIR`, if set;
/// - `~/.config/gosleep-dev/` when `GOSLEEP_ENV=dev`;
/// - `~/.config/gosleep/` otherwise.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("GOSLEEP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GOSLEEP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("gosleep-dev")
            } else {
                base_dir.join("gosleep")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
