//! Inspect command implementation.

use anyhow::{bail, Context, Result};
use laverna_backup::export::{list_entries, read_archive};
use laverna_storage::{Bytes, LocalStorage, SaveTarget};
use serde_json::json;
use std::path::Path;

/// Read an archive through the same target type exports are saved with.
async fn load_archive(archive: &Path) -> Result<Bytes> {
    let dir = archive
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let filename = archive
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid archive path {}", archive.display()))?;

    match LocalStorage::new(dir).load(filename).await {
        Ok(payload) => Ok(payload),
        Err(e) if e.is_not_found() => bail!("No archive at {}", archive.display()),
        Err(e) => Err(e).with_context(|| format!("Cannot read {}", archive.display())),
    }
}

/// Print the entries of an archive, or a per-profile summary as JSON.
pub async fn run_inspect(archive: &Path, archive_root: &str, as_json: bool) -> Result<()> {
    let payload = load_archive(archive).await?;

    if !as_json {
        for name in list_entries(&payload).context("Not a backup archive")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let data = read_archive(payload, archive_root)
        .await
        .context("Not a backup archive")?;
    let summary: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(profile, collections)| {
            let counts: serde_json::Map<String, serde_json::Value> = collections
                .iter()
                .map(|c| (c.kind().to_string(), json!(c.len())))
                .collect();
            (profile.clone(), serde_json::Value::Object(counts))
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use laverna_backup::export::ArchiveBuilder;

    #[tokio::test]
    async fn test_missing_archive() {
        let temp = tempfile::tempdir().unwrap();
        let err = load_archive(&temp.path().join("laverna-backup.zip"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("No archive at"));
    }

    #[tokio::test]
    async fn test_inspect_saved_archive() {
        let temp = tempfile::tempdir().unwrap();
        let builder = ArchiveBuilder::new();
        builder.insert("laverna-backups/default/tags.json", "[]");
        let payload = builder.finalize().await.unwrap();
        let path = temp.path().join("laverna-backup.zip");
        std::fs::write(&path, &payload).unwrap();

        assert_eq!(load_archive(&path).await.unwrap(), payload);
        run_inspect(&path, "laverna-backups", false).await.unwrap();
        run_inspect(&path, "laverna-backups", true).await.unwrap();
    }
}
