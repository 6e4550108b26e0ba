// Tabshell Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

// Core modules
pub mod history;
pub mod session;
pub mod settings;

// Shared identifiers and the tab event bus
pub mod state;

// Tab, view and navigation logic
pub mod modules;

pub use history::{BrowsingHistory, NavigationEntry};
pub use modules::navigation::{format_url_preview, Location};
pub use session::Session;

/// Installs the global logger: timestamped lines on stderr at `level`.
pub fn setup_logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
