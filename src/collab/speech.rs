use crate::collab::wav::DurationProbe;
use crate::config::manifest::AudioManifest;
use crate::config::model::{Speaker, VideoConfig};
use crate::foundation::error::{StoryError, StoryResult};
use std::path::{Path, PathBuf};

/// Tuning values forwarded verbatim to the voice-cloning service.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechStyle {
    /// Guidance strength, as a decimal string (`"2.0"`).
    pub cfg_value: String,
    /// Inference steps, as a decimal string (`"15"`).
    pub steps: String,
    /// Loudness normalization switch; omitted from the request when `None`.
    pub normalize: Option<String>,
    /// Denoise switch; omitted from the request when `None`.
    pub denoise: Option<String>,
}

/// One synthesis call.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    /// 3 to 10 second sample of the target voice.
    pub reference_audio_path: PathBuf,
    /// Transcript of the reference sample.
    pub reference_transcript: String,
    /// Text to speak.
    pub text: String,
    /// Service tuning.
    pub style: SpeechStyle,
}

impl SpeechRequest {
    /// Request speaking `text` in `speaker`'s cloned voice.
    pub fn for_speaker(speaker: &Speaker, text: impl Into<String>) -> Self {
        Self {
            reference_audio_path: PathBuf::from(&speaker.voice.ref_audio_path),
            reference_transcript: speaker.voice.ref_text.clone(),
            text: text.into(),
            style: SpeechStyle {
                cfg_value: speaker.voice.cfg_value.clone(),
                steps: speaker.voice.steps.clone(),
                normalize: None,
                denoise: None,
            },
        }
    }
}

/// Text-to-speech collaborator.
///
/// Implementations own transport and retry policy. A failed call should be reported as
/// [`StoryError::Dependency`] carrying the service status and body.
pub trait SpeechSynthesizer {
    /// Synthesize `req` and return the encoded audio file bytes.
    fn synthesize(&self, req: &SpeechRequest) -> StoryResult<Vec<u8>>;
}

/// File name used for scene `index` inside an audio directory.
pub fn scene_audio_file(index: usize) -> String {
    format!("scene-{index}.wav")
}

/// Synthesize every scene's dialogue into `out_dir`, measure it and build the manifest.
///
/// Scenes whose speaker is not in the speaker table are skipped (no file, no manifest entry).
/// Collaborator and probe failures end the run.
#[tracing::instrument(skip(cfg, synth, probe), fields(scenes = cfg.scenes.len()))]
pub fn generate_scene_audio(
    cfg: &VideoConfig,
    synth: &dyn SpeechSynthesizer,
    probe: &dyn DurationProbe,
    out_dir: &Path,
) -> StoryResult<AudioManifest> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| StoryError::io(format!("create '{}': {e}", out_dir.display())))?;

    let mut measurements = Vec::with_capacity(cfg.scenes.len());
    for (index, scene) in cfg.scenes.iter().enumerate() {
        let Some(speaker) = cfg.speaker(&scene.speaker_id) else {
            tracing::warn!(
                scene = index,
                speaker = %scene.speaker_id,
                "unknown speaker, no audio generated"
            );
            continue;
        };

        let req = SpeechRequest::for_speaker(speaker, scene.dialogue_text.clone());
        let audio = synth.synthesize(&req)?;
        if audio.is_empty() {
            return Err(StoryError::dependency(
                "speech",
                None,
                format!("empty audio for scene {index}"),
            ));
        }

        let path = out_dir.join(scene_audio_file(index));
        std::fs::write(&path, &audio)
            .map_err(|e| StoryError::io(format!("write '{}': {e}", path.display())))?;
        let secs = probe.duration_secs(&path)?;
        tracing::debug!(scene = index, secs, bytes = audio.len(), "scene audio written");
        measurements.push((index, path.display().to_string(), secs));
    }

    let manifest = AudioManifest::from_measurements(cfg, measurements)?;
    tracing::info!(
        entries = manifest.scenes.len(),
        total_frames = manifest.total_frames,
        "audio manifest built"
    );
    Ok(manifest)
}

/// Rebuild a manifest from audio previously written by [`generate_scene_audio`].
///
/// Every scene with a known speaker must have its `scene-{i}.wav` in `dir`.
#[tracing::instrument(skip(cfg, probe))]
pub fn manifest_from_audio_dir(
    cfg: &VideoConfig,
    dir: &Path,
    probe: &dyn DurationProbe,
) -> StoryResult<AudioManifest> {
    let measurements = cfg
        .scenes
        .iter()
        .enumerate()
        .filter(|(_, scene)| cfg.speaker(&scene.speaker_id).is_some())
        .map(|(index, _)| {
            let path = dir.join(scene_audio_file(index));
            let secs = probe.duration_secs(&path)?;
            Ok((index, path.display().to_string(), secs))
        })
        .collect::<StoryResult<Vec<_>>>()?;
    AudioManifest::from_measurements(cfg, measurements)
}

#[cfg(test)]
#[path = "../../tests/unit/collab/speech.rs"]
mod tests;
