use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ferrokey::{Dialect, dialect_for_name};

use super::mapping::{EntityMapping, parse_mappings};

/// Command line of the `ferrokey-cli` binary.
///
/// Every option can also be supplied through the environment (or a `.env`
/// file), which is how the binary is usually driven from scripts.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferrokey-cli",
    version,
    about = "Export identifier generator schemas and dispense identifiers"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Log output format, written to stderr.
    ///
    /// Environment variable: `FERROKEY_LOG_FORMAT`
    #[arg(
        long,
        global = true,
        env = "FERROKEY_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the DDL for every persistent generator, de-duplicated.
    Schema(SchemaArgs),
    /// Generate identifiers against a fresh in-memory database.
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MappingArgs {
    /// JSON file listing the entity mappings.
    ///
    /// Environment variable: `FERROKEY_MAPPINGS`
    #[arg(long, env = "FERROKEY_MAPPINGS")]
    pub mappings: PathBuf,

    /// SQL dialect: `h2`, `postgresql`, `mysql` or `sqlserver`.
    ///
    /// Environment variable: `FERROKEY_DIALECT`
    #[arg(long, env = "FERROKEY_DIALECT", default_value_t = String::from("h2"))]
    pub dialect: String,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Print the drop script instead of the create script.
    #[arg(long, default_value_t = false)]
    pub drop: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Identifiers generated per entity.
    ///
    /// Environment variable: `FERROKEY_COUNT`
    #[arg(long, env = "FERROKEY_COUNT", default_value_t = 10)]
    pub count: usize,

    /// Threads sharing each generator, one session per thread.
    ///
    /// Environment variable: `FERROKEY_THREADS`
    #[arg(long, env = "FERROKEY_THREADS", default_value_t = 1)]
    pub threads: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Schema { drop: bool },
    Generate { count: usize, threads: usize },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub action: Action,
    pub dialect: Arc<dyn Dialect>,
    pub mappings: Vec<EntityMapping>,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let (action, mapping) = match args.command {
            Command::Schema(schema) => (Action::Schema { drop: schema.drop }, schema.mapping),
            Command::Generate(generate) => {
                if generate.count == 0 {
                    bail!("FERROKEY_COUNT must be greater than 0");
                }
                if generate.threads == 0 {
                    bail!("FERROKEY_THREADS must be greater than 0");
                }
                if generate.threads > generate.count {
                    bail!(
                        "FERROKEY_THREADS ({}) exceeds FERROKEY_COUNT ({})",
                        generate.threads,
                        generate.count
                    );
                }
                (
                    Action::Generate {
                        count: generate.count,
                        threads: generate.threads,
                    },
                    generate.mapping,
                )
            }
        };

        let dialect = dialect_for_name(&mapping.dialect)?;

        let raw = std::fs::read_to_string(&mapping.mappings).with_context(|| {
            format!(
                "could not read mapping file {}",
                mapping.mappings.display()
            )
        })?;
        let mappings = parse_mappings(&raw)?;
        if mappings.is_empty() {
            bail!("mapping file {} maps no entities", mapping.mappings.display());
        }

        Ok(Self {
            action,
            dialect,
            mappings,
            log_format: args.log_format,
        })
    }
}
