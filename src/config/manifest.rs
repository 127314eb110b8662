use crate::config::model::VideoConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{StoryError, StoryResult};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Measured audio for one scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Scene index in the configuration document.
    pub index: usize,
    /// Synthesized audio file.
    pub audio_path: String,
    /// Measured duration.
    pub duration_secs: f64,
    /// `ceil(duration_secs * fps)`.
    pub frames: u64,
}

/// Persisted per-scene audio measurements.
///
/// This is the authoritative length source for the timeline builder after explicit overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioManifest {
    /// Rate the frame counts were computed at.
    pub fps: u32,
    /// [`VideoConfig::dialogue_fingerprint`] of the document the audio was made for.
    pub config_fingerprint: String,
    /// Entries in ascending scene order. Skipped scenes have no entry.
    pub scenes: Vec<ManifestEntry>,
    /// Sum of entry frame counts.
    pub total_frames: u64,
}

impl AudioManifest {
    /// Build a manifest from `(scene index, audio path, seconds)` measurements.
    ///
    /// Measurements must be positive and finite.
    pub fn from_measurements(
        cfg: &VideoConfig,
        measurements: impl IntoIterator<Item = (usize, String, f64)>,
    ) -> StoryResult<Self> {
        let fps = cfg.frame_rate()?;
        let mut scenes = measurements
            .into_iter()
            .map(|(index, audio_path, duration_secs)| {
                if !duration_secs.is_finite() || duration_secs <= 0.0 {
                    return Err(StoryError::configuration(format!(
                        "scene {index}: measured duration must be positive, got {duration_secs}"
                    )));
                }
                Ok(ManifestEntry {
                    index,
                    audio_path,
                    duration_secs,
                    frames: fps.secs_to_frames_ceil(duration_secs),
                })
            })
            .collect::<StoryResult<Vec<_>>>()?;
        scenes.sort_by_key(|e| e.index);

        let manifest = Self {
            fps: cfg.fps,
            config_fingerprint: cfg.dialogue_fingerprint(),
            total_frames: scenes.iter().map(|e| e.frames).sum(),
            scenes,
        };
        manifest.check_consistency(cfg)?;
        Ok(manifest)
    }

    /// Reject a manifest that was produced for a different document or is internally inconsistent.
    pub fn check_consistency(&self, cfg: &VideoConfig) -> StoryResult<()> {
        if self.fps != cfg.fps {
            return Err(StoryError::configuration(format!(
                "manifest fps {} does not match config fps {}",
                self.fps, cfg.fps
            )));
        }
        let expected = cfg.dialogue_fingerprint();
        if self.config_fingerprint != expected {
            return Err(StoryError::configuration(format!(
                "manifest was built for a different scene list (fingerprint {} != {expected})",
                self.config_fingerprint
            )));
        }

        let fps = Fps::integer(self.fps)?;
        let mut seen = BTreeSet::new();
        for e in &self.scenes {
            if e.index >= cfg.scenes.len() {
                return Err(StoryError::configuration(format!(
                    "manifest entry for scene {} but config has {} scenes",
                    e.index,
                    cfg.scenes.len()
                )));
            }
            if !seen.insert(e.index) {
                return Err(StoryError::configuration(format!(
                    "manifest has duplicate entries for scene {}",
                    e.index
                )));
            }
            let frames = fps.secs_to_frames_ceil(e.duration_secs);
            if frames == 0 || frames != e.frames {
                return Err(StoryError::configuration(format!(
                    "manifest scene {}: {} frames recorded for {}s (expected {frames})",
                    e.index, e.frames, e.duration_secs
                )));
            }
        }

        let total: u64 = self.scenes.iter().map(|e| e.frames).sum();
        if total != self.total_frames {
            return Err(StoryError::configuration(format!(
                "manifest totalFrames {} != sum of scene frames {total}",
                self.total_frames
            )));
        }
        Ok(())
    }

    /// Measured entry for a scene.
    pub fn entry(&self, scene_index: usize) -> Option<&ManifestEntry> {
        self.scenes
            .binary_search_by_key(&scene_index, |e| e.index)
            .ok()
            .map(|i| &self.scenes[i])
    }

    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StoryError::serde(format!("parse audio manifest JSON: {e}")))
    }

    /// Parse a manifest from disk.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::io(format!("open audio manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write pretty JSON to disk.
    pub fn write_path(&self, path: impl AsRef<Path>) -> StoryResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            StoryError::io(format!("create audio manifest '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| StoryError::serde(format!("write audio manifest JSON: {e}")))?;
        w.flush()
            .map_err(|e| StoryError::io(format!("flush '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/manifest.rs"]
mod tests;
