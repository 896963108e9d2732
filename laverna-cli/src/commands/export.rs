//! Export command implementation.

use anyhow::{Context, Result};
use laverna_backup::export::{fetch_profile, ExportOptions, ExportReport, ExportSettings, Exporter};
use laverna_backup::source::DirSource;
use laverna_backup::{BackupConfig, ProfileData};
use laverna_storage::LocalStorage;
use std::sync::Arc;

fn exporter(config: &BackupConfig) -> (Arc<DirSource>, Exporter) {
    let source = Arc::new(DirSource::new(
        &config.source.data_dir,
        &config.source.config_profile,
    ));
    let target = Arc::new(LocalStorage::new(&config.storage.output_dir));
    let exporter =
        Exporter::new(source.clone(), target).with_settings(ExportSettings::from(config));
    (source, exporter)
}

/// Run the export command.
///
/// With no profiles every configured profile is exported; otherwise only the
/// named ones are fetched and exported.
pub async fn run_export(config: &BackupConfig, profiles: Vec<String>) -> Result<()> {
    println!(
        "Exporting from {} to {}",
        config.source.data_dir.display(),
        config.storage.output_dir.display()
    );
    let (source, exporter) = exporter(config);

    let options = if profiles.is_empty() {
        ExportOptions::full()
    } else {
        let mut data = ProfileData::new();
        for profile in profiles {
            let collections = fetch_profile(source.as_ref(), &profile)
                .await
                .with_context(|| format!("Cannot read profile '{}'", profile))?;
            data.insert(profile, collections);
        }
        ExportOptions::data(data)
    };

    let report = exporter.run(options).await.context("Export failed")?;
    print_report(&report);
    Ok(())
}

/// Run the key export command.
pub async fn run_export_key(config: &BackupConfig) -> Result<()> {
    let (_, exporter) = exporter(config);
    let report = exporter
        .run(ExportOptions::key())
        .await
        .context("Key export failed")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ExportReport) {
    if report.is_noop() {
        println!("Nothing to export");
        return;
    }
    if !report.profiles.is_empty() {
        println!("Profiles: {}", report.profiles.join(", "));
    }
    if report.entries > 0 {
        println!("Exported {} entries", report.entries);
    }
    if let Some(saved) = &report.saved {
        println!("Saved {} ({} bytes)", saved.filename, saved.size);
    }
}
