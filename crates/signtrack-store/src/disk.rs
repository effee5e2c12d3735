//! On-disk tracking artifacts.
//!
//! Each processed video gets its own directory under `tracks_dir`, holding
//! the tracking records in one or more writer formats plus a `meta.json`
//! document. Writers implement [`ArtifactWriter`], so codecs beyond the
//! built-in compressed JSONL (e.g. a columnar table) can be plugged in by
//! the embedding application.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tracing::debug;

use signtrack_models::{ExportEntry, FrameRecord, RunMetadata, VideoId};

use crate::error::StoreResult;

/// File name of the metadata document in a run directory.
const METADATA_FILE: &str = "meta.json";

/// File name of the export index document.
const EXPORT_INDEX_FILE: &str = "index.json";

/// A serializer for one tracking artifact format.
pub trait ArtifactWriter: Send + Sync {
    /// Write the records into `dir`, returning the created file path.
    fn write(&self, dir: &Path, records: &[FrameRecord]) -> StoreResult<PathBuf>;

    /// Short tag identifying the format (used for the job's
    /// `output_format` field).
    fn format_tag(&self) -> &'static str;
}

/// Gzip-compressed line-delimited JSON writer.
pub struct JsonlGzWriter;

impl ArtifactWriter for JsonlGzWriter {
    fn write(&self, dir: &Path, records: &[FrameRecord]) -> StoreResult<PathBuf> {
        let path = dir.join("tracking.jsonl.gz");
        let file = File::create(&path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        for record in records {
            serde_json::to_writer(&mut encoder, record)?;
            encoder.write_all(b"\n")?;
        }
        encoder.finish()?;
        debug!(path = %path.display(), frames = records.len(), "Saved tracking JSONL");
        Ok(path)
    }

    fn format_tag(&self) -> &'static str {
        "jsonl"
    }
}

/// Paths produced by one run's persistence.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub dir: PathBuf,
    pub tracks: Vec<PathBuf>,
    pub metadata: PathBuf,
}

/// Per-video artifact store rooted at a tracks directory.
pub struct TrackStore {
    tracks_dir: PathBuf,
    writers: Vec<Box<dyn ArtifactWriter>>,
}

impl TrackStore {
    /// Create a store writing compressed JSONL records.
    pub fn new(tracks_dir: impl Into<PathBuf>) -> Self {
        Self {
            tracks_dir: tracks_dir.into(),
            writers: vec![Box::new(JsonlGzWriter)],
        }
    }

    /// Add an additional artifact writer (e.g. a columnar format).
    pub fn with_writer(mut self, writer: Box<dyn ArtifactWriter>) -> Self {
        self.writers.push(writer);
        self
    }

    /// Output directory for one video.
    pub fn video_dir(&self, video_id: &VideoId) -> PathBuf {
        self.tracks_dir.join(video_id.as_str())
    }

    /// Format tag covering all configured writers, e.g. `"jsonl+parquet"`.
    pub fn output_format(&self) -> String {
        self.writers
            .iter()
            .map(|w| w.format_tag())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Persist one run: all configured track formats plus the metadata
    /// document.
    pub fn write_run(
        &self,
        video_id: &VideoId,
        records: &[FrameRecord],
        metadata: &RunMetadata,
    ) -> StoreResult<RunArtifacts> {
        let dir = self.video_dir(video_id);
        fs::create_dir_all(&dir)?;

        let mut tracks = Vec::with_capacity(self.writers.len());
        for writer in &self.writers {
            tracks.push(writer.write(&dir, records)?);
        }

        let metadata_path = dir.join(METADATA_FILE);
        save_metadata(&metadata_path, metadata)?;

        Ok(RunArtifacts {
            dir,
            tracks,
            metadata: metadata_path,
        })
    }
}

/// Write a run's metadata document as pretty-printed JSON.
pub fn save_metadata(path: &Path, metadata: &RunMetadata) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, metadata)?;
    debug!(path = %path.display(), "Saved metadata");
    Ok(())
}

/// Write the export index over completed jobs.
pub fn write_export_index(dir: &Path, entries: &[ExportEntry]) -> StoreResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_INDEX_FILE);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, entries)?;
    debug!(path = %path.display(), entries = entries.len(), "Saved export index");
    Ok(path)
}

/// SHA-256 of a file's contents, hex-encoded.
pub fn sha256_file(path: &Path) -> StoreResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
