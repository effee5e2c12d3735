//! Manifest ingestion: register videos and queue jobs in bulk.
//!
//! The manifest is a JSON-lines file, one record per video. Records without
//! an explicit `local_path` resolve relative to the manifest's directory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use signtrack_models::NewVideo;
use signtrack_store::{sha256_file, Ledger};

use crate::error::{WorkerError, WorkerResult};

/// One manifest row describing a source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Word/gloss label for the sign
    pub label: String,
    /// Video file name
    pub filename: String,
    /// Path to the local file; defaults to `<manifest dir>/<filename>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    /// Original remote URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

/// Counts reported by one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Videos registered and queued by this run
    pub created: usize,
    /// Videos already known to the ledger (skipped)
    pub existing: usize,
    /// Manifest rows whose file was not found on disk (skipped)
    pub missing: usize,
}

/// Read a JSON-lines manifest, resolving relative paths against the
/// manifest's own directory. Blank lines are ignored.
pub fn read_manifest(path: &Path) -> WorkerResult<Vec<ManifestRecord>> {
    if !path.exists() {
        return Err(WorkerError::input(format!(
            "Manifest not found: {}",
            path.display()
        )));
    }
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut record: ManifestRecord = serde_json::from_str(&line)
            .map_err(|e| WorkerError::input(format!("Invalid manifest line: {e}")))?;
        if record.local_path.is_none() {
            record.local_path = Some(base.join(&record.filename).to_string_lossy().into_owned());
        }
        records.push(record);
    }
    Ok(records)
}

/// Create queued jobs for manifest records.
///
/// Rows whose file is missing are skipped with a warning; rows whose
/// filename is already registered count as existing and get no new job
/// (reprocessing a known video is an explicit operation, not an ingest
/// side effect).
pub async fn ingest_manifest(
    ledger: &Ledger,
    records: &[ManifestRecord],
) -> WorkerResult<IngestSummary> {
    let mut summary = IngestSummary::default();

    for record in records {
        let local_path = record
            .local_path
            .clone()
            .unwrap_or_else(|| record.filename.clone());

        if !Path::new(&local_path).exists() {
            warn!(path = %local_path, "File not found, skipping");
            summary.missing += 1;
            continue;
        }

        if ledger.find_video_by_filename(&record.filename).await?.is_some() {
            summary.existing += 1;
            continue;
        }

        let mut new_video = NewVideo {
            label: record.label.clone(),
            filename: record.filename.clone(),
            local_path: local_path.clone(),
            remote_url: record.remote_url.clone(),
            content_hash: None,
        };
        if let Ok(hash) = sha256_file(Path::new(&local_path)) {
            new_video.content_hash = Some(hash);
        }

        ledger.ensure_video_and_create_job(&new_video).await?;
        summary.created += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_manifest_resolves_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("manifest.jsonl");
        let mut file = File::create(&manifest).unwrap();
        writeln!(file, r#"{{"label": "hei", "filename": "hei_001.mp4"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"label": "takk", "filename": "takk_001.mp4", "local_path": "/data/takk_001.mp4", "remote_url": "https://example.com/takk"}}"#
        )
        .unwrap();

        let records = read_manifest(&manifest).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].local_path.as_deref(),
            Some(tmp.path().join("hei_001.mp4").to_str().unwrap())
        );
        assert_eq!(records[1].local_path.as_deref(), Some("/data/takk_001.mp4"));
        assert_eq!(
            records[1].remote_url.as_deref(),
            Some("https://example.com/takk")
        );
    }

    #[test]
    fn test_read_manifest_missing_file() {
        let err = read_manifest(Path::new("/nonexistent/manifest.jsonl")).unwrap_err();
        assert!(matches!(err, WorkerError::Input(_)));
    }

    #[test]
    fn test_read_manifest_rejects_bad_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("manifest.jsonl");
        std::fs::write(&manifest, "not json\n").unwrap();
        assert!(read_manifest(&manifest).is_err());
    }

    #[tokio::test]
    async fn test_ingest_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("hei_001.mp4");
        std::fs::write(&present, b"fake video bytes").unwrap();

        let ledger = Ledger::connect_in_memory().await.unwrap();
        ledger.init_schema().await.unwrap();

        let records = vec![
            ManifestRecord {
                label: "hei".into(),
                filename: "hei_001.mp4".into(),
                local_path: Some(present.to_string_lossy().into_owned()),
                remote_url: None,
            },
            ManifestRecord {
                label: "takk".into(),
                filename: "takk_001.mp4".into(),
                local_path: Some(tmp.path().join("takk_001.mp4").to_string_lossy().into_owned()),
                remote_url: None,
            },
        ];

        let first = ingest_manifest(&ledger, &records).await.unwrap();
        assert_eq!(
            first,
            IngestSummary {
                created: 1,
                existing: 0,
                missing: 1
            }
        );

        // Second run finds the video already registered
        let second = ingest_manifest(&ledger, &records).await.unwrap();
        assert_eq!(
            second,
            IngestSummary {
                created: 0,
                existing: 1,
                missing: 1
            }
        );

        let video = ledger
            .find_video_by_filename("hei_001.mp4")
            .await
            .unwrap()
            .unwrap();
        assert!(video.content_hash.is_some());
    }
}
