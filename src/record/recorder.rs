use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::time::{Duration, Instant};

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
use crate::encode::sink::{FrameSink, InMemorySink, RecordingArtifact, SinkConfig, StillImageSink};
use crate::events::channel::{Event, EventChannel, SubscriptionId};
use crate::events::task::{Deferred, TaskPoll};
use crate::foundation::core::{Canvas, Fps, TickIndex};
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::render::backend::FrameRGBA;
use crate::render::surface::CompositeSurface;

/// Output format of a recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingFormat {
    /// Raw premultiplied frames kept in memory.
    #[default]
    Frames,
    /// PNG of the last captured frame.
    Png,
    /// H.264 MP4 through the system `ffmpeg`.
    Mp4,
}

/// Recorder configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecorderOpts {
    /// Frames buffered between the render thread and the encoder before frames are dropped.
    pub channel_capacity: usize,
    /// Output format.
    pub format: RecordingFormat,
    /// Output file for `png`/`mp4`. Required for `mp4`.
    pub out_path: Option<PathBuf>,
    /// Background used to flatten alpha for `mp4` (straight-alpha RGBA8).
    pub bg_rgba: [u8; 4],
}

impl Default for RecorderOpts {
    fn default() -> Self {
        Self {
            channel_capacity: 8,
            format: RecordingFormat::Frames,
            out_path: None,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl RecorderOpts {
    /// Check option values.
    pub fn validate(&self) -> FaceliftResult<()> {
        if self.channel_capacity == 0 {
            return Err(FaceliftError::validation(
                "recorder channel_capacity must be >= 1",
            ));
        }
        if self.format == RecordingFormat::Mp4 && self.out_path.is_none() {
            return Err(FaceliftError::validation("mp4 recording requires out_path"));
        }
        Ok(())
    }

    /// Check that the chosen format can be produced on this machine.
    pub fn check_environment(&self) -> FaceliftResult<()> {
        if self.format == RecordingFormat::Mp4 && !is_ffmpeg_on_path() {
            return Err(FaceliftError::unsupported(
                "mp4 recording requires ffmpeg on PATH",
            ));
        }
        Ok(())
    }

    fn make_sink(&self, session: u64) -> FaceliftResult<Box<dyn FrameSink>> {
        Ok(match self.format {
            RecordingFormat::Frames => Box::new(InMemorySink::new()),
            RecordingFormat::Png => match self.out_path.as_ref() {
                Some(p) => Box::new(StillImageSink::new().with_out_path(numbered(p, session))),
                None => Box::new(StillImageSink::new()),
            },
            RecordingFormat::Mp4 => {
                let p = self
                    .out_path
                    .as_ref()
                    .ok_or_else(|| FaceliftError::recording("mp4 recording requires out_path"))?;
                let mut opts = FfmpegSinkOpts::new(numbered(p, session));
                opts.bg_rgba = self.bg_rgba;
                Box::new(FfmpegSink::new(opts))
            }
        })
    }
}

/// `out.mp4` for the first session, `out-2.mp4`, `out-3.mp4`, ... afterwards.
fn numbered(path: &std::path::Path, session: u64) -> PathBuf {
    if session <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{session}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{session}"),
    };
    path.with_file_name(name)
}

/// Whether a recording session is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordingState {
    /// No session active.
    #[default]
    Idle,
    /// Frames are being captured.
    Recording,
}

/// A finished recording.
#[derive(Clone, Debug)]
pub struct RecordingResult {
    /// Session number (1-based).
    pub session: u64,
    /// Frames the encoder consumed.
    pub frames_captured: u64,
    /// Frames dropped because the encoder fell behind.
    pub frames_dropped: u64,
    /// Frame size.
    pub canvas: Canvas,
    /// Nominal frame rate.
    pub fps: Fps,
    /// First recorded tick, if any frame was captured.
    pub first_tick: Option<TickIndex>,
    /// Last recorded tick, if any frame was captured.
    pub last_tick: Option<TickIndex>,
    /// What the sink produced.
    pub artifact: RecordingArtifact,
}

impl RecordingResult {
    /// The encoded output bytes.
    pub fn data(&self) -> FaceliftResult<Vec<u8>> {
        self.artifact.to_bytes()
    }

    /// MIME type of [`RecordingResult::data`].
    pub fn media_type(&self) -> &'static str {
        self.artifact.media_type()
    }
}

/// Recorder lifecycle events.
#[derive(Debug)]
pub enum RecorderEvent {
    /// A session started.
    Started {
        /// Session number.
        session: u64,
    },
    /// A session finished encoding (or failed to).
    Completed {
        /// Session number.
        session: u64,
        /// Outcome of the encode.
        result: FaceliftResult<RecordingResult>,
    },
}

/// Routing key for [`RecorderEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderEventKind {
    /// [`RecorderEvent::Started`].
    Started,
    /// [`RecorderEvent::Completed`].
    Completed,
}

impl Event for RecorderEvent {
    type Kind = RecorderEventKind;

    fn kind(&self) -> RecorderEventKind {
        match self {
            Self::Started { .. } => RecorderEventKind::Started,
            Self::Completed { .. } => RecorderEventKind::Completed,
        }
    }
}

struct EncodeOutcome {
    frames: u64,
    first_tick: Option<TickIndex>,
    last_tick: Option<TickIndex>,
    artifact: FaceliftResult<RecordingArtifact>,
}

struct ActiveSession {
    id: u64,
    tx: SyncSender<(TickIndex, Arc<FrameRGBA>)>,
    task: Deferred<EncodeOutcome>,
    dropped: u64,
    encoder_gone: bool,
}

struct FinishingSession {
    id: u64,
    task: Deferred<EncodeOutcome>,
    dropped: u64,
}

type SinkFactory = Box<dyn FnMut(u64) -> FaceliftResult<Box<dyn FrameSink>>>;

/// Captures the composite surface into an encoded stream on demand.
///
/// Lives on the render thread. Encoding happens on a per-session worker fed through a bounded
/// channel; when the worker falls behind, frames are dropped instead of stalling the loop.
/// Completion is reported through [`Recorder::on_complete`] once [`Recorder::poll`] observes
/// it.
pub struct Recorder {
    opts: RecorderOpts,
    canvas: Canvas,
    fps: Fps,
    make_sink: SinkFactory,

    active: Option<ActiveSession>,
    finishing: Vec<FinishingSession>,
    sessions: u64,
    events: EventChannel<RecorderEvent>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("opts", &self.opts)
            .field("state", &self.state())
            .field("sessions", &self.sessions)
            .field("finishing", &self.finishing.len())
            .finish_non_exhaustive()
    }
}

impl Recorder {
    /// Recorder producing frames of `canvas` at `fps`, with sinks chosen by `opts.format`.
    pub fn new(opts: RecorderOpts, canvas: Canvas, fps: Fps) -> Self {
        let sink_opts = opts.clone();
        Self::with_sink_factory(opts, canvas, fps, move |session| {
            sink_opts.make_sink(session)
        })
    }

    /// Recorder using a custom sink per session.
    pub fn with_sink_factory(
        opts: RecorderOpts,
        canvas: Canvas,
        fps: Fps,
        make_sink: impl FnMut(u64) -> FaceliftResult<Box<dyn FrameSink>> + 'static,
    ) -> Self {
        Self {
            opts,
            canvas,
            fps,
            make_sink: Box::new(make_sink),
            active: None,
            finishing: Vec::new(),
            sessions: 0,
            events: EventChannel::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    /// Return `true` while a session is active.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Sessions stopped whose completion has not been delivered yet.
    pub fn pending_completions(&self) -> usize {
        self.finishing.len()
    }

    /// Register a callback fired when a session starts.
    pub fn on_start(&mut self, mut callback: impl FnMut(u64) + 'static) -> SubscriptionId {
        self.events.subscribe(RecorderEventKind::Started, move |e| {
            if let RecorderEvent::Started { session } = e {
                callback(*session);
            }
        })
    }

    /// Register a callback fired once per stopped session with its result.
    pub fn on_complete(
        &mut self,
        mut callback: impl FnMut(&FaceliftResult<RecordingResult>) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(RecorderEventKind::Completed, move |e| {
            if let RecorderEvent::Completed { result, .. } = e {
                callback(result);
            }
        })
    }

    /// Remove an `on_start`/`on_complete` subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Begin a session. A no-op returning `Ok(false)` when already recording.
    pub fn start(&mut self) -> FaceliftResult<bool> {
        if self.active.is_some() {
            return Ok(false);
        }
        let id = self.sessions + 1;
        let sink = (self.make_sink)(id)?;
        let cfg = SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
        };
        let (tx, rx) = mpsc::sync_channel(self.opts.channel_capacity.max(1));
        let task = Deferred::spawn(format!("encoder-{id}"), move || run_encoder(sink, cfg, rx))
            .map_err(|e| FaceliftError::recording(format!("failed to start encoder: {e}")))?;

        self.sessions = id;
        self.active = Some(ActiveSession {
            id,
            tx,
            task,
            dropped: 0,
            encoder_gone: false,
        });
        tracing::info!(session = id, "recording started");
        self.events.publish(&RecorderEvent::Started { session: id });
        Ok(true)
    }

    /// Finalize the active session asynchronously. A no-op returning `false` when idle.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        // Closing the channel tells the encoder to finalize.
        drop(active.tx);
        tracing::info!(
            session = active.id,
            dropped = active.dropped,
            "recording stopping"
        );
        self.finishing.push(FinishingSession {
            id: active.id,
            task: active.task,
            dropped: active.dropped,
        });
        true
    }

    /// Start when idle, stop when recording. Returns the new state.
    pub fn toggle(&mut self) -> FaceliftResult<RecordingState> {
        if self.is_recording() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.state())
    }

    /// Hand the presented frame to the active session. Never blocks.
    ///
    /// Returns `true` when the frame was queued for encoding.
    pub fn sample(&mut self, tick: TickIndex, surface: &CompositeSurface) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match active.tx.try_send((tick, surface.snapshot())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                active.dropped += 1;
                if active.dropped == 1 {
                    tracing::warn!(
                        session = active.id,
                        tick = tick.0,
                        "encoder behind, dropping frames"
                    );
                } else {
                    tracing::debug!(
                        session = active.id,
                        tick = tick.0,
                        "recording frame dropped"
                    );
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                active.dropped += 1;
                if !active.encoder_gone {
                    active.encoder_gone = true;
                    tracing::warn!(session = active.id, "encoder stopped accepting frames");
                }
                false
            }
        }
    }

    /// Deliver completions for sessions whose encoder has finished. Never blocks.
    ///
    /// Returns the number of completions delivered.
    pub fn poll(&mut self) -> usize {
        self.collect(|task| task.poll())
    }

    /// Wait up to `timeout` for every stopped session to finish, delivering completions.
    ///
    /// Intended for shutdown; the render loop uses [`Recorder::poll`].
    pub fn join_pending(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        self.collect(|task| {
            task.wait_timeout(deadline.saturating_duration_since(Instant::now()))
        })
    }

    fn collect(
        &mut self,
        mut check: impl FnMut(&mut Deferred<EncodeOutcome>) -> TaskPoll<EncodeOutcome>,
    ) -> usize {
        let mut done = Vec::new();
        let mut i = 0;
        while i < self.finishing.len() {
            match check(&mut self.finishing[i].task) {
                TaskPoll::Pending => i += 1,
                TaskPoll::Ready(outcome) => {
                    let s = self.finishing.remove(i);
                    done.push((s.id, Ok(outcome), s.dropped));
                }
                TaskPoll::Lost => {
                    let s = self.finishing.remove(i);
                    done.push((s.id, Err(()), s.dropped));
                }
            }
        }

        let delivered = done.len();
        for (session, outcome, dropped) in done {
            let result = match outcome {
                Ok(o) => o.artifact.map(|artifact| RecordingResult {
                    session,
                    frames_captured: o.frames,
                    frames_dropped: dropped,
                    canvas: self.canvas,
                    fps: self.fps,
                    first_tick: o.first_tick,
                    last_tick: o.last_tick,
                    artifact,
                }),
                Err(()) => Err(FaceliftError::recording(
                    "encoder thread exited without a result",
                )),
            };
            match &result {
                Ok(r) => tracing::info!(
                    session,
                    frames = r.frames_captured,
                    dropped = r.frames_dropped,
                    "recording complete"
                ),
                Err(e) => tracing::warn!(session, error = %e, "recording failed"),
            }
            self.events
                .publish(&RecorderEvent::Completed { session, result });
        }
        delivered
    }
}

fn run_encoder(
    mut sink: Box<dyn FrameSink>,
    cfg: SinkConfig,
    rx: mpsc::Receiver<(TickIndex, Arc<FrameRGBA>)>,
) -> EncodeOutcome {
    let mut out = EncodeOutcome {
        frames: 0,
        first_tick: None,
        last_tick: None,
        artifact: Ok(RecordingArtifact::Empty),
    };
    if let Err(e) = sink.begin(cfg) {
        // Dropping the receiver makes the render thread count further frames as dropped.
        out.artifact = Err(e);
        return out;
    }
    for (tick, frame) in rx.iter() {
        if let Err(e) = sink.push_frame(tick, frame) {
            // The sink still owns resources (an encoder process) that only `end` releases.
            if let Err(end_err) = sink.end() {
                tracing::debug!(error = %end_err, "sink cleanup after failed frame");
            }
            out.artifact = Err(e);
            return out;
        }
        out.frames += 1;
        out.first_tick.get_or_insert(tick);
        out.last_tick = Some(tick);
    }
    out.artifact = sink.end();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/record/recorder.rs"]
mod tests;
