//! Minimal stderr logger.
//!
//! Prints `[elapsed LEVEL target] message`, with targets inside the lenscan
//! crates shortened to the crate name. Verbosity applies to the lenscan
//! crates; dependencies are capped at warnings. Install it once at startup with
//! [`init_with_level`]; with the `tracing` feature, [`init_tracing`] installs a
//! `tracing-subscriber` formatter instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Targets of this workspace's crates (`lenscan`, `lenscan_core`, ...).
const OWN_TARGET_PREFIX: &str = "lenscan";

/// Third-party crates are only heard from at this level or above.
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn new(level: LevelFilter) -> Self {
        Self {
            level,
            started: Instant::now(),
        }
    }

    /// Effective filter for a target: `-v` widens our own crates only.
    fn level_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET_PREFIX) {
            self.level
        } else {
            self.level.min(DEPENDENCY_LEVEL)
        }
    }

    fn format(&self, record: &Record) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target();
        // Drop the module path inside our own crates; keep foreign targets whole.
        let target = match target.split_once("::") {
            Some((krate, _)) if krate.starts_with(OWN_TARGET_PREFIX) => krate,
            _ => target,
        };
        format!(
            "[{elapsed:8.3}s {:<5} {target}] {}",
            record.level(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger. `level` applies to the lenscan crates; other
/// targets stay at warnings and errors unless `level` is stricter.
///
/// Only the first call installs a logger; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger::new(level));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Map a `-v` count to a level: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    fn record<'a>(target: &'a str, level: log::Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .args(args)
            .level(level)
            .target(target)
            .build()
    }

    fn meta(target: &str, level: log::Level) -> Metadata<'_> {
        Metadata::builder().target(target).level(level).build()
    }

    #[test]
    fn verbosity_widens_own_targets_only() {
        let logger = StderrLogger::new(LevelFilter::Debug);

        assert!(logger.enabled(&meta("lenscan_session::session", log::Level::Debug)));
        assert!(logger.enabled(&meta("lenscan", log::Level::Info)));
        assert!(!logger.enabled(&meta("lenscan_core::analyzer", log::Level::Trace)));

        assert!(!logger.enabled(&meta("png::decoder", log::Level::Info)));
        assert!(logger.enabled(&meta("png::decoder", log::Level::Warn)));
    }

    #[test]
    fn quiet_level_also_quiets_dependencies() {
        let logger = StderrLogger::new(LevelFilter::Error);
        assert!(!logger.enabled(&meta("lenscan", log::Level::Warn)));
        assert!(!logger.enabled(&meta("image", log::Level::Warn)));
    }

    #[test]
    fn format_shortens_own_targets() {
        let logger = StderrLogger::new(LevelFilter::Info);
        let own = logger.format(&record(
            "lenscan_session::session",
            log::Level::Warn,
            format_args!("frame dropped"),
        ));
        assert!(own.ends_with(" WARN  lenscan_session] frame dropped"), "{own}");

        let foreign = logger.format(&record("png::decoder", log::Level::Error, format_args!("bad crc")));
        assert!(foreign.ends_with(" ERROR png::decoder] bad crc"), "{foreign}");
    }
}
