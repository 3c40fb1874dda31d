use clap::Parser;
use routekit::cli::{run_cli, Cli};
use routekit::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let mut log_config = LogConfig::from_env();
    if std::env::var("ROUTEKIT_LOG_LEVEL").is_err() {
        log_config.log_level = "warn".to_string();
    }
    init_logging(&log_config)?;

    let cli = Cli::parse();
    run_cli(&cli, &mut std::io::stdout().lock())
}
