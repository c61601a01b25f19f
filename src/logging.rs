// File: ./src/logging.rs
// Installs the `simplelog` back end for the `log` macros used by the library.
use crate::context::AppContext;
use anyhow::Result;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::OpenOptions;

/// Terminal level: warnings only, unless `--verbose`.
pub fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Logs to stderr and appends to `<cache dir>/deadlines.log` at `file_level`.
/// A log file that cannot be opened only disables the file sink.
pub fn init(ctx: &dyn AppContext, file_level: LevelFilter, verbose: bool) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level(verbose),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if file_level != LevelFilter::Off
        && let Some(path) = ctx.get_log_path()
    {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(file_level, config, file)),
            Err(e) => eprintln!("Warning: cannot open log file {}: {}", path.display(), e),
        }
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_level() {
        assert_eq!(terminal_level(false), LevelFilter::Warn);
        assert_eq!(terminal_level(true), LevelFilter::Debug);
    }
}
