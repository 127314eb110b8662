use crate::foundation::error::{StoryError, StoryResult};
use std::path::Path;

/// Measures the playback length of a synthesized audio file.
pub trait DurationProbe: Send + Sync {
    /// Duration of the audio at `path`, in seconds.
    fn duration_secs(&self, path: &Path) -> StoryResult<f64>;
}

/// Header facts of a RIFF/WAVE file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavInfo {
    /// `1` for integer PCM, `3` for float, `0xFFFE` for extensible.
    pub format_tag: u16,
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bytes per second of audio.
    pub byte_rate: u32,
    /// Bytes per interleaved frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Length of the `data` chunk payload.
    pub data_bytes: u64,
}

impl WavInfo {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.data_bytes as f64 / self.byte_rate as f64
    }
}

/// Reads durations from RIFF/WAVE headers without decoding samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavDurationProbe;

impl DurationProbe for WavDurationProbe {
    fn duration_secs(&self, path: &Path) -> StoryResult<f64> {
        let bytes = std::fs::read(path)
            .map_err(|e| StoryError::io(format!("read audio '{}': {e}", path.display())))?;
        let info = parse_wav_header(&bytes)
            .map_err(|e| StoryError::io(format!("audio '{}': {e}", path.display())))?;
        Ok(info.duration_secs())
    }
}

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Walk the RIFF chunk list and extract the `fmt ` and `data` facts.
///
/// A `data` size of `0xFFFFFFFF` (streamed output) or one that overruns the buffer is clamped to
/// the bytes actually present.
pub fn parse_wav_header(bytes: &[u8]) -> Result<WavInfo, String> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err("not a RIFF/WAVE file".to_owned());
    }

    let mut fmt: Option<WavInfo> = None;
    let mut pos = 12usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = le_u32(bytes, pos + 4) as usize;
        let body = pos + 8;
        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err("truncated fmt chunk".to_owned());
                }
                fmt = Some(WavInfo {
                    format_tag: le_u16(bytes, body),
                    channels: le_u16(bytes, body + 2),
                    sample_rate: le_u32(bytes, body + 4),
                    byte_rate: le_u32(bytes, body + 8),
                    block_align: le_u16(bytes, body + 12),
                    bits_per_sample: le_u16(bytes, body + 14),
                    data_bytes: 0,
                });
            }
            b"data" => {
                let Some(mut info) = fmt else {
                    return Err("data chunk before fmt chunk".to_owned());
                };
                if info.byte_rate == 0 || info.channels == 0 {
                    return Err("fmt chunk has zero byte rate or channels".to_owned());
                }
                let available = bytes.len() - body;
                info.data_bytes = size.min(available) as u64;
                return Ok(info);
            }
            _ => {}
        }
        // Chunks are word aligned.
        pos = body.saturating_add(size).saturating_add(size & 1);
    }
    Err(if fmt.is_some() {
        "missing data chunk".to_owned()
    } else {
        "missing fmt chunk".to_owned()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/collab/wav.rs"]
mod tests;
