use anyhow::Result;
use clap::{Parser, Subcommand};
use laverna_backup::config::{default_config_path, BackupConfig, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "laverna-backup")]
#[command(about = "Laverna backup tools - export notes, files and keys")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LAVERNA_BACKUP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export profiles into a zip archive
    Export {
        /// Directory with <profile>/<kind>.json files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory the archive is saved into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only export these profiles (repeatable); defaults to every configured profile
        #[arg(short, long = "profile")]
        profiles: Vec<String>,
    },

    /// Export the private key on its own
    ExportKey {
        /// Directory with <profile>/<kind>.json files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory the key file is saved into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a backup archive contains
    Inspect {
        /// Archive file
        archive: PathBuf,

        /// Print a JSON summary instead of entry names
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = BackupConfig::load_or_default(&config_path)?;
    init_logging(&config.logging);
    tracing::debug!("Config file: {}", config_path.display());

    match cli.command {
        Commands::Export {
            data_dir,
            output,
            profiles,
        } => {
            apply_overrides(&mut config, data_dir, output);
            commands::run_export(&config, profiles).await?;
        }
        Commands::ExportKey { data_dir, output } => {
            apply_overrides(&mut config, data_dir, output);
            commands::run_export_key(&config).await?;
        }
        Commands::Inspect { archive, json } => {
            commands::run_inspect(&archive, &config.export.archive_root, json).await?;
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut BackupConfig, data_dir: Option<PathBuf>, output: Option<PathBuf>) {
    if let Some(dir) = data_dir {
        config.source.data_dir = dir;
    }
    if let Some(dir) = output {
        config.storage.output_dir = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_profiles() {
        let cli = Cli::try_parse_from([
            "laverna-backup",
            "export",
            "--profile",
            "notes-db",
            "--profile",
            "work",
            "--output",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Export {
                profiles, output, ..
            } => {
                assert_eq!(profiles, vec!["notes-db", "work"]);
                assert_eq!(output, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overrides_replace_dirs() {
        let mut config = BackupConfig::default();
        apply_overrides(
            &mut config,
            Some(PathBuf::from("/data")),
            Some(PathBuf::from("/backups")),
        );
        assert_eq!(config.source.data_dir, PathBuf::from("/data"));
        assert_eq!(config.storage.output_dir, PathBuf::from("/backups"));

        apply_overrides(&mut config, None, None);
        assert_eq!(config.source.data_dir, PathBuf::from("/data"));
    }
}
