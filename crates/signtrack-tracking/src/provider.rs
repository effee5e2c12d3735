//! Provider traits wrapping external detection implementations.
//!
//! These traits give the orchestrator a uniform interface over detectors
//! and frame decoders, which live outside this crate. Provider selection is
//! a closed mapping from [`ProviderKind`] to a registered constructor,
//! resolved once at batch start.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::RgbImage;
use signtrack_models::FrameDetection;
use tracing::debug;

use crate::error::{TrackingError, TrackingResult};

/// One decoded frame sampled from a video.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// 0-based index in output order (not source order when downsampling)
    pub frame_index: u32,
    /// Timestamp of the frame in the source video
    pub time_s: f64,
    /// Decoded raster handed to the detector
    pub image: RgbImage,
}

/// Iterator over the sampled frames of one video.
pub type FrameIter = Box<dyn Iterator<Item = TrackingResult<SampledFrame>> + Send>;

/// Landmark detection provider.
///
/// One `detect` call per sampled frame. A frame with no detections is not
/// an error; providers return empty landmark lists instead. Providers are
/// expensive to construct and are reused across all jobs in a batch; the
/// orchestrator calls `close` exactly once at batch end.
impl fmt::Debug for dyn TrackingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingProvider")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

pub trait TrackingProvider: Send {
    /// Detect landmarks in a single frame.
    fn detect(
        &mut self,
        image: &RgbImage,
        frame_index: u32,
        time_s: f64,
    ) -> TrackingResult<FrameDetection>;

    /// Provider name for logging and ledger bookkeeping.
    fn name(&self) -> &'static str;

    /// Release detector resources. Must be idempotent.
    fn close(&mut self) {}
}

/// Source of decoded, timestamped frames for a video file.
///
/// Each `open` call restarts decoding from the beginning of the file and
/// yields a finite, ordered frame sequence sampled at `target_fps`.
pub trait FrameSource: Send + Sync {
    fn open(&self, video_path: &Path, target_fps: f64) -> TrackingResult<FrameIter>;
}

/// The closed set of supported detection providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    MediaPipe,
    RtmPose,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::MediaPipe => "mediapipe",
            ProviderKind::RtmPose => "rtmpose",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mediapipe" => Ok(ProviderKind::MediaPipe),
            "rtmpose" | "mmpose" => Ok(ProviderKind::RtmPose),
            other => Err(TrackingError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Settings handed to provider constructors.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    /// Minimum confidence for a detection to be reported at all
    pub min_detection_confidence: f64,
    /// Minimum confidence for frame-to-frame tracking continuation
    pub min_tracking_confidence: f64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

type ProviderCtor =
    Box<dyn Fn(&ProviderSettings) -> TrackingResult<Box<dyn TrackingProvider>> + Send + Sync>;

/// Registry mapping provider kinds to constructors.
///
/// Populated by the embedding application with the detectors compiled into
/// its build. Resolving an unregistered kind is an explicit error rather
/// than a runtime load failure.
#[derive(Default)]
pub struct ProviderRegistry {
    ctors: HashMap<ProviderKind, ProviderCtor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a provider kind, replacing any previous
    /// registration.
    pub fn register<F>(&mut self, kind: ProviderKind, ctor: F)
    where
        F: Fn(&ProviderSettings) -> TrackingResult<Box<dyn TrackingProvider>>
            + Send
            + Sync
            + 'static,
    {
        self.ctors.insert(kind, Box::new(ctor));
    }

    /// Whether a kind has a registered constructor.
    pub fn supports(&self, kind: ProviderKind) -> bool {
        self.ctors.contains_key(&kind)
    }

    /// Construct a provider instance for a kind.
    pub fn resolve(
        &self,
        kind: ProviderKind,
        settings: &ProviderSettings,
    ) -> TrackingResult<Box<dyn TrackingProvider>> {
        match self.ctors.get(&kind) {
            Some(ctor) => {
                debug!(provider = %kind, "Constructing tracking provider");
                ctor(settings)
            }
            None => Err(TrackingError::UnsupportedProvider(kind.to_string())),
        }
    }
}
