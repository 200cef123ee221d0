use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. A configured level replaces
/// the `--verbose` defaults.
fn filter_directives(verbose: bool, log_level: Option<&str>) -> String {
    match log_level.map(str::trim).filter(|level| !level.is_empty()) {
        Some(level) => level.to_string(),
        None if verbose => "review_harvester=debug,info".to_string(),
        None => "review_harvester=info,warn".to_string(),
    }
}

fn default_filter(verbose: bool, log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = filter_directives(verbose, log_level);
        EnvFilter::try_new(&directives).unwrap_or_else(|e| {
            eprintln!("⚠️ Ignoring invalid log level '{}': {}", directives, e);
            EnvFilter::new(filter_directives(verbose, None))
        })
    })
}

pub fn init_cli_logger(verbose: bool, log_level: Option<&str>) {
    tracing_subscriber::registry()
        .with(default_filter(verbose, log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines on stderr, for running the harvester under a log collector.
pub fn init_json_logger(verbose: bool, log_level: Option<&str>) {
    tracing_subscriber::registry()
        .with(default_filter(verbose, log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_picks_default_directives() {
        assert_eq!(filter_directives(false, None), "review_harvester=info,warn");
        assert_eq!(filter_directives(true, None), "review_harvester=debug,info");
    }

    #[test]
    fn test_configured_level_replaces_defaults() {
        assert_eq!(filter_directives(false, Some("debug")), "debug");
        assert_eq!(
            filter_directives(true, Some(" review_harvester=trace ")),
            "review_harvester=trace"
        );
        assert_eq!(filter_directives(true, Some("  ")), "review_harvester=debug,info");
    }

    #[test]
    fn test_configured_level_parses_as_env_filter() {
        let directives = filter_directives(false, Some("review_harvester=trace,warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
