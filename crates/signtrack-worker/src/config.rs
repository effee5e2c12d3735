//! Worker configuration.

use std::path::PathBuf;

use signtrack_tracking::{ProviderKind, ProviderSettings, SmoothingConfig, TrackAlphas};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root directory for all pipeline outputs
    pub workspace_dir: PathBuf,
    /// Ledger database file
    pub db_path: PathBuf,
    /// Per-video tracking artifact directory
    pub tracks_dir: PathBuf,
    /// Export index directory
    pub exports_dir: PathBuf,
    /// Frame sampling rate handed to the frame source
    pub target_fps: f64,
    /// Detection provider to resolve at batch start
    pub provider: ProviderKind,
    /// Minimum confidence for a detection to be reported
    pub min_detection_confidence: f64,
    /// Minimum confidence for frame-to-frame tracking continuation
    pub min_tracking_confidence: f64,
    /// EMA smoothing factor for body pose landmarks
    pub ema_alpha_pose: f64,
    /// EMA smoothing factor for hand landmarks
    pub ema_alpha_hands: f64,
    /// EMA smoothing factor for face landmarks
    pub ema_alpha_face: f64,
    /// Max landmark change per frame in normalized coordinates, when set
    pub velocity_clamp: Option<f64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let workspace_dir = PathBuf::from("workspace");
        Self {
            db_path: workspace_dir.join("tracker.db"),
            tracks_dir: workspace_dir.join("tracks"),
            exports_dir: workspace_dir.join("exports"),
            workspace_dir,
            target_fps: 25.0,
            provider: ProviderKind::MediaPipe,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            ema_alpha_pose: 0.35,
            ema_alpha_hands: 0.55,
            ema_alpha_face: 0.40,
            velocity_clamp: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Path defaults derive from `SIGNTRACK_WORKSPACE` unless overridden
    /// individually. An unknown provider name is rejected here, before any
    /// job runs.
    pub fn from_env() -> WorkerResult<Self> {
        let defaults = Self::default();

        let workspace_dir = std::env::var("SIGNTRACK_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or(defaults.workspace_dir);

        let db_path = std::env::var("SIGNTRACK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_dir.join("tracker.db"));
        let tracks_dir = std::env::var("SIGNTRACK_TRACKS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_dir.join("tracks"));
        let exports_dir = std::env::var("SIGNTRACK_EXPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_dir.join("exports"));

        let provider = match std::env::var("SIGNTRACK_PROVIDER") {
            Ok(name) => name
                .parse::<ProviderKind>()
                .map_err(|e| WorkerError::config(e.to_string()))?,
            Err(_) => defaults.provider,
        };

        let velocity_clamp = std::env::var("SIGNTRACK_VELOCITY_CLAMP")
            .ok()
            .and_then(|s| s.parse().ok());

        Ok(Self {
            workspace_dir,
            db_path,
            tracks_dir,
            exports_dir,
            target_fps: env_parse("SIGNTRACK_TARGET_FPS", defaults.target_fps),
            provider,
            min_detection_confidence: env_parse(
                "SIGNTRACK_MIN_DETECTION_CONFIDENCE",
                defaults.min_detection_confidence,
            ),
            min_tracking_confidence: env_parse(
                "SIGNTRACK_MIN_TRACKING_CONFIDENCE",
                defaults.min_tracking_confidence,
            ),
            ema_alpha_pose: env_parse("SIGNTRACK_EMA_ALPHA_POSE", defaults.ema_alpha_pose),
            ema_alpha_hands: env_parse("SIGNTRACK_EMA_ALPHA_HANDS", defaults.ema_alpha_hands),
            ema_alpha_face: env_parse("SIGNTRACK_EMA_ALPHA_FACE", defaults.ema_alpha_face),
            velocity_clamp,
        })
    }

    /// Smoothing parameters for the pipeline.
    pub fn smoothing(&self) -> SmoothingConfig {
        SmoothingConfig {
            alphas: TrackAlphas {
                pose: self.ema_alpha_pose,
                left_hand: self.ema_alpha_hands,
                right_hand: self.ema_alpha_hands,
                face: self.ema_alpha_face,
            },
            min_confidence: self.min_detection_confidence,
            velocity_clamp: self.velocity_clamp,
        }
    }

    /// Settings handed to the provider constructor.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            min_detection_confidence: self.min_detection_confidence,
            min_tracking_confidence: self.min_tracking_confidence,
        }
    }

    /// Create the workspace directory tree.
    pub fn ensure_dirs(&self) -> WorkerResult<()> {
        for dir in [&self.workspace_dir, &self.tracks_dir, &self.exports_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
