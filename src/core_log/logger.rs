use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Initializes the global logger with a `[timestamp] [LEVEL] message` format.
///
/// `RUST_LOG` wins over `default_level`; `verbose` bumps the default to debug.
pub fn init_logger(default_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { default_level };
    Builder::from_env(Env::default().default_filter_or(level))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(buf, "[{}] [{}] {}", timestamp, record.level(), record.args())
        })
        .init();
}
