//! Configures logging for the command line.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use env_logger::Builder;
use log::{trace, LevelFilter};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Maps the number of `-v` flags to a level. Without flags only errors are
/// logged; warnings are reported through diagnostics instead.
pub fn level_for(verbosity: u8) -> Result<LevelFilter, String> {
    match verbosity {
        0 => Ok(LevelFilter::Error),
        1 => Ok(LevelFilter::Warn),
        2 => Ok(LevelFilter::Info),
        3 => Ok(LevelFilter::Debug),
        4 => Ok(LevelFilter::Trace),
        _ => Err(format!("Verbosity is at most 4, got {}", verbosity)),
    }
}

/// Configures the log with the verbosity, writing to the file when one is
/// given and to stderr otherwise.
pub fn configure(verbosity: u8, log_file: Option<&Path>) -> Result<(), String> {
    let level = level_for(verbosity)?;

    let mut builder = Builder::new();

    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("Unable to create log file {}. {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .format(|buf, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            writeln!(
                buf,
                "[{} {} {}] {}",
                now,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(level)
        .try_init()
        .map_err(|e| format!("Unable to configure logging. {}", e))?;

    trace!("Logger level {}", level);
    Ok(())
}

#[cfg(test)]
mod test {
    use log::LevelFilter;

    use super::level_for;

    #[test]
    fn level_for_when_no_flags_then_error() {
        assert_eq!(level_for(0), Ok(LevelFilter::Error));
    }

    #[test]
    fn level_for_when_four_flags_then_trace() {
        assert_eq!(level_for(4), Ok(LevelFilter::Trace));
    }

    #[test]
    fn level_for_when_five_flags_then_err() {
        assert!(level_for(5).is_err());
    }
}
