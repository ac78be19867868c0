pub mod commands;
pub mod config;
pub mod shutdown;

pub use commands::Args;
pub use config::Settings;
pub use shutdown::spawn_shutdown_listener;

/// Human-readable, level-tagged lines on stderr.
pub fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
