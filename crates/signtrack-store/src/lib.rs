//! Persistence for the SignTrack pipeline.
//!
//! Two concerns live here:
//! - the relational job ledger ([`Ledger`]): videos, jobs, and quality
//!   issues in a single SQLite file, every mutation transactional;
//! - the on-disk tracking artifacts ([`TrackStore`]): per-video output
//!   directories with compressed line-delimited records and a metadata
//!   document.

pub mod disk;
pub mod error;
pub mod ledger;

pub use disk::{
    save_metadata, sha256_file, write_export_index, ArtifactWriter, JsonlGzWriter, RunArtifacts,
    TrackStore,
};
pub use error::{StoreError, StoreResult};
pub use ledger::{EnsuredJob, JobFilter, JobListing, Ledger, LedgerStats, QualityStats};
