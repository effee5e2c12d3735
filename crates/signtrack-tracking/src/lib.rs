//! Landmark tracking post-processing for the SignTrack pipeline.
//!
//! This crate holds the pure processing core:
//! - the detection provider seam ([`TrackingProvider`], [`FrameSource`],
//!   [`ProviderRegistry`]) the orchestrator drives,
//! - the confidence-weighted temporal smoothing engine
//!   ([`SequenceSmoother`]),
//! - the quality scoring engine ([`score_sequence`]).

pub mod error;
pub mod provider;
pub mod quality;
pub mod smoothing;

pub use error::{TrackingError, TrackingResult};
pub use provider::{
    FrameIter, FrameSource, ProviderKind, ProviderRegistry, ProviderSettings, SampledFrame,
    TrackingProvider,
};
pub use quality::score_sequence;
pub use smoothing::{EmaFilter, SequenceSmoother, SmoothingConfig, TrackAlphas, VelocityClamp};
