#![doc = include_str!("../README.md")]

mod cli;

use std::io::Write;

use clap::Parser;
use cli::commands::{build_generators, generate, schema_script};
use cli::config::{Action, AppConfig, CliArgs};
use cli::telemetry::init_telemetry;
use ferrokey::IdentifierGeneratorFactory;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry(args.log_format)?;
    let config = AppConfig::try_from(args)?;
    log_startup_info(&config);

    let factory = IdentifierGeneratorFactory::new();
    let generators = build_generators(&config.mappings, config.dialect.as_ref(), &factory)?;

    let mut out = std::io::stdout().lock();
    match config.action {
        Action::Schema { drop } => {
            for statement in schema_script(&generators, config.dialect.as_ref(), drop)? {
                writeln!(out, "{statement};")?;
            }
        }
        Action::Generate { count, threads } => {
            for generated in generate(&config.dialect, &generators, count, threads)? {
                writeln!(out, "{}", serde_json::to_string(&generated)?)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn log_startup_info(_config: &AppConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::debug!("Running with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Running {:?} for {} mappings on {:?}",
            _config.action,
            _config.mappings.len(),
            _config.dialect
        );
    }
}
