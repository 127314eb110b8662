use crate::compose::layers::FrameState;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryError, StoryResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: Fps,
    /// Frames that will be pushed.
    pub frames: u64,
}

/// Sink contract for consuming evaluated frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameState) -> StoryResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> StoryResult<()>;
}

fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> StoryResult<()> {
    match last {
        Some(prev) if idx <= prev => Err(StoryError::evaluation(format!(
            "frame {} pushed after frame {}",
            idx.0, prev.0
        ))),
        _ => Ok(()),
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameState)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameState)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameState) -> StoryResult<()> {
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StoryResult<()> {
        Ok(())
    }
}

/// Writes one JSON object per frame, one per line.
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
    last: Option<FrameIndex>,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Sink writing to a new file at `path`.
    pub fn create(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::create(path)
            .map_err(|e| StoryError::io(format!("create '{}': {e}", path.display())))?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            written: 0,
        }
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> FrameSink for JsonLinesSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()> {
        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            frames = cfg.frames,
            "json lines sink open"
        );
        self.last = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameState) -> StoryResult<()> {
        check_order(self.last, idx)?;
        serde_json::to_writer(&mut self.out, frame)
            .map_err(|e| StoryError::serde(format!("frame {}: {e}", idx.0)))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| StoryError::io(e.to_string()))?;
        self.last = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> StoryResult<()> {
        self.out.flush().map_err(|e| StoryError::io(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sink.rs"]
mod tests;
