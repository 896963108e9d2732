//! Public export entry point.

use futures::future::try_join_all;
use laverna_storage::{Bytes, SaveTarget};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::archive::ArchiveBuilder;
use super::collection::{profile_base, CollectionExporter};
use super::profile::export_profile;
use super::serializer::EntrySerializer;
use super::types::{ExportMode, ExportOptions, ExportReport, ExportSettings};
use crate::error::Result;
use crate::model::ProfileData;
use crate::source::{configured_profiles, private_key, DataSource};

/// Drives one export from mode dispatch to save.
///
/// `run` consumes the exporter, so nothing it holds outlives the run,
/// whether it succeeds or fails. Each archive export gets a fresh
/// [`ArchiveBuilder`].
pub struct Exporter {
    source: Arc<dyn DataSource>,
    target: Arc<dyn SaveTarget>,
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(source: Arc<dyn DataSource>, target: Arc<dyn SaveTarget>) -> Self {
        Self {
            source,
            target,
            settings: ExportSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run the export selected by `options`.
    #[instrument(skip(self, options), fields(mode = %options.mode()))]
    pub async fn run(self, options: ExportOptions) -> Result<ExportReport> {
        if options.export_key {
            return self.export_key().await;
        }
        match options.data {
            Some(data) => self.export_data(data).await,
            None => self.export_all().await,
        }
    }

    /// Save the private key as a standalone file.
    async fn export_key(&self) -> Result<ExportReport> {
        let key = private_key(self.source.as_ref(), &self.settings.private_key_config).await?;
        let saved = self
            .target
            .save(Bytes::from(key), &self.settings.key_filename)
            .await?;
        info!(filename = %saved.filename, "private key exported");

        Ok(ExportReport {
            mode: ExportMode::Key,
            profiles: Vec::new(),
            entries: 0,
            saved: Some(saved),
        })
    }

    /// Export collections the caller already fetched.
    async fn export_data(&self, data: ProfileData) -> Result<ExportReport> {
        if data.is_empty() {
            info!("no data to export");
            return Ok(ExportReport {
                mode: ExportMode::Data,
                profiles: Vec::new(),
                entries: 0,
                saved: None,
            });
        }

        let builder = ArchiveBuilder::new();
        let exporter = CollectionExporter::new(&builder, self.serializer());
        let mut profiles = Vec::new();

        for (profile_id, collections) in &data {
            if collections.is_empty() {
                debug!(%profile_id, "profile has no collections");
                continue;
            }
            exporter.export_collections(
                &profile_base(&self.settings.archive_root, profile_id),
                collections,
            )?;
            profiles.push(profile_id.clone());
        }

        self.save_archive(ExportMode::Data, builder, profiles).await
    }

    /// Export every configured profile.
    async fn export_all(&self) -> Result<ExportReport> {
        let profiles =
            configured_profiles(self.source.as_ref(), &self.settings.profiles_config).await?;
        info!(count = profiles.len(), "exporting profiles");

        let builder = ArchiveBuilder::new();
        let exporter = CollectionExporter::new(&builder, self.serializer());
        let runs = profiles.iter().map(|profile_id| {
            export_profile(
                self.source.as_ref(),
                &exporter,
                &self.settings.archive_root,
                profile_id,
            )
        });
        try_join_all(runs).await?;

        self.save_archive(ExportMode::Full, builder, profiles).await
    }

    async fn save_archive(
        &self,
        mode: ExportMode,
        builder: ArchiveBuilder,
        profiles: Vec<String>,
    ) -> Result<ExportReport> {
        let entries = builder.len();
        let payload = builder.finalize().await?;
        let saved = self
            .target
            .save(payload, &self.settings.archive_filename)
            .await?;
        info!(filename = %saved.filename, size = saved.size, entries, "archive saved");

        Ok(ExportReport {
            mode,
            profiles,
            entries,
            saved: Some(saved),
        })
    }

    fn serializer(&self) -> EntrySerializer {
        EntrySerializer::new(self.settings.pretty_json)
    }
}

impl Drop for Exporter {
    fn drop(&mut self) {
        debug!(
            source = self.source.source_name(),
            target = self.target.backend_name(),
            "exporter released"
        );
    }
}
