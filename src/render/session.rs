use crate::compose::layers::FrameState;
use crate::compose::schedule::{Schedule, hash_frame};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::render::sink::{FrameSink, SinkConfig};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::mpsc;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames evaluated per batch before the producer waits on the sink.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between evaluation workers and the sink thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_delivered: u64,
    /// Order-sensitive digest of every delivered frame.
    pub fingerprint: Fingerprint,
}

/// Drives a [`Schedule`] over a frame range and streams the evaluated frames into a sink.
///
/// Evaluation is pure, so the parallel and serial paths deliver identical frame sequences.
pub struct RenderSession<'a> {
    schedule: &'a Schedule,
    opts: RenderSessionOpts,
}

impl<'a> RenderSession<'a> {
    /// New session over an assembled schedule.
    pub fn new(schedule: &'a Schedule, opts: RenderSessionOpts) -> Self {
        Self { schedule, opts }
    }

    /// Render a single frame.
    pub fn render_frame(&self, frame: FrameIndex) -> StoryResult<FrameState> {
        self.schedule.evaluate(frame)
    }

    /// Render the whole composition.
    pub fn render_all(&self, sink: &mut dyn FrameSink) -> StoryResult<RenderStats> {
        self.render_range(self.schedule.range(), sink)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, out-of-order worker completion is reordered at the sink boundary.
    #[tracing::instrument(skip(self, sink), fields(parallel = self.opts.parallel))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> StoryResult<RenderStats> {
        if range.is_empty() {
            return Err(StoryError::evaluation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.schedule.total_frames {
            return Err(StoryError::evaluation(format!(
                "render_range end {} is past the composition end {}",
                range.end.0, self.schedule.total_frames
            )));
        }

        let cfg = SinkConfig {
            width: self.schedule.canvas.width,
            height: self.schedule.canvas.height,
            fps: self.schedule.fps,
            frames: range.len_frames(),
        };
        let cap = self.opts.channel_capacity.max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size).min(range.len_frames());
        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let schedule = self.schedule;

        std::thread::scope(|scope| -> StoryResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> StoryResult<(u64, Fingerprint)> {
                sink_ref.begin(cfg)?;

                let mut hasher = StableHasher::new();
                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameState>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        deliver(sink_ref, &mut hasher, next, &frame)?;
                        next += 1;
                        continue;
                    }
                    let msg = rx.recv().map_err(|_| {
                        StoryError::evaluation("sink channel disconnected unexpectedly")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);
                }

                sink_ref.end()?;
                Ok((next - range_start, hasher.finish()))
            });

            let produce_res = produce(schedule, pool.as_ref(), &tx, range, chunk_size);

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| StoryError::evaluation("sink thread panicked"))?;

            let (delivered, fingerprint) = match (produce_res, enc_res) {
                (Ok(()), res) => res?,
                // Producers only see a closed channel once the sink thread has failed.
                (Err(StoryError::Evaluation(msg)), Err(sink_err)) if msg == SINK_CLOSED => {
                    return Err(sink_err);
                }
                (Err(e), _) => return Err(e),
            };
            tracing::info!(frames = delivered, "range rendered");
            Ok(RenderStats {
                frames_total: range.len_frames(),
                frames_delivered: delivered,
                fingerprint,
            })
        })
    }
}

const SINK_CLOSED: &str = "sink thread is not accepting frames";

struct FrameMsg {
    idx: FrameIndex,
    frame: FrameState,
}

fn send(tx: &mpsc::SyncSender<FrameMsg>, idx: FrameIndex, frame: FrameState) -> StoryResult<()> {
    tx.send(FrameMsg { idx, frame })
        .map_err(|_| StoryError::evaluation(SINK_CLOSED))
}

fn produce(
    schedule: &Schedule,
    pool: Option<&rayon::ThreadPool>,
    tx: &mpsc::SyncSender<FrameMsg>,
    range: FrameRange,
    chunk_size: u64,
) -> StoryResult<()> {
    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        match pool {
            Some(pool) => pool.install(|| {
                (chunk_start..chunk_end).into_par_iter().try_for_each_with(
                    tx.clone(),
                    |tx, f| -> StoryResult<()> {
                        let frame = schedule.evaluate(FrameIndex(f))?;
                        send(tx, FrameIndex(f), frame)
                    },
                )
            })?,
            None => {
                for f in chunk_start..chunk_end {
                    let frame = schedule.evaluate(FrameIndex(f))?;
                    send(tx, FrameIndex(f), frame)?;
                }
            }
        }
        tracing::debug!(chunk_start, chunk_end, "chunk evaluated");
        chunk_start = chunk_end;
    }
    Ok(())
}

fn deliver(
    sink: &mut dyn FrameSink,
    hasher: &mut StableHasher,
    idx: u64,
    frame: &FrameState,
) -> StoryResult<()> {
    hash_frame(hasher, frame);
    sink.push_frame(FrameIndex(idx), frame)
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> StoryResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StoryError::configuration(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StoryError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
