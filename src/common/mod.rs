//! Commonly used code.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::level_filters::LevelFilter;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Map the `log` level selected on the command line to a `tracing` level filter.
///
/// Silencing all output (`-qqq`) turns logging off completely.
pub fn level_filter(verbose: &Verbosity<InfoLevel>) -> LevelFilter {
    match verbose.log_level() {
        Some(level) => LevelFilter::from_level(match level {
            log::Level::Error => tracing::Level::ERROR,
            log::Level::Warn => tracing::Level::WARN,
            log::Level::Info => tracing::Level::INFO,
            log::Level::Debug => tracing::Level::DEBUG,
            log::Level::Trace => tracing::Level::TRACE,
        }),
        None => LevelFilter::OFF,
    }
}

/// The version of `csq2tsv` package.
#[cfg(not(test))]
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This allows us to override the version to `0.0.0` in tests.
pub fn version() -> &'static str {
    #[cfg(test)]
    return "0.0.0";
    #[cfg(not(test))]
    return VERSION;
}

#[cfg(test)]
mod test {
    use clap_verbosity_flag::{InfoLevel, Verbosity};
    use pretty_assertions::assert_eq;
    use tracing::level_filters::LevelFilter;

    #[rstest::rstest]
    #[case(0, 0, LevelFilter::INFO)]
    #[case(1, 0, LevelFilter::DEBUG)]
    #[case(2, 0, LevelFilter::TRACE)]
    #[case(0, 1, LevelFilter::WARN)]
    #[case(0, 2, LevelFilter::ERROR)]
    #[case(0, 3, LevelFilter::OFF)]
    fn level_filter(#[case] verbose: u8, #[case] quiet: u8, #[case] expected: LevelFilter) {
        let verbosity = Verbosity::<InfoLevel>::new(verbose, quiet);

        assert_eq!(super::level_filter(&verbosity), expected);
    }

    #[test]
    fn version() {
        assert_eq!(super::version(), "0.0.0");
    }
}
