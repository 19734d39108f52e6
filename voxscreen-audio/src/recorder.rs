//
// CPAL-based microphone recorder.
//
// The capture stream lives on a dedicated worker thread for the duration of
// one session. The worker converts incoming buffers to mono f32 fragments
// and accumulates them until the controller asks it to stop; stopping (or
// dropping the controller) ends the worker and drops the stream, which is
// what releases the microphone device.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream};

use voxscreen_core::{AudioPayload, SessionId};

use crate::wav::encode_wav_mono16;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);
const STOP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no input device found")]
    NoInputDevice,

    #[error("failed to get default config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("audio worker failed: {0}")]
    Worker(String),

    #[error("audio worker startup timeout")]
    WorkerTimeout,

    #[error("recording stop timed out")]
    StopTimeout,

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("no recording session is active")]
    NotRecording,

    #[error("stopped before any audio was captured")]
    EmptyCapture,

    #[error("failed to encode wav: {0}")]
    Encode(#[from] hound::Error),

    #[error("internal channel error")]
    Channel,
}

enum Cmd {
    Stop(mpsc::Sender<Vec<Vec<f32>>>),
    Shutdown,
}

enum WorkerMsg {
    Ready,
    Error(String),
}

struct ActiveCapture {
    id: SessionId,
    started_at: Instant,
    sample_rate_hz: u32,
    cmd_tx: mpsc::Sender<Cmd>,
    worker: Option<JoinHandle<()>>,
}

/// Owns at most one live capture session.
///
/// `Inactive -> (start succeeds) -> Active -> (stop) -> Inactive`; a failed
/// start leaves the controller Inactive with an error instead of a payload.
/// Dropping the controller while Active shuts the worker down and releases
/// the device; the captured audio is discarded.
pub struct AudioRecorder {
    session: Option<ActiveCapture>,
}

impl AudioRecorder {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Whole seconds since the current Active period began.
    ///
    /// Zero immediately after a successful start; `None` while Inactive.
    pub fn elapsed_secs(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.started_at.elapsed().as_secs())
    }

    /// Open the default input device and begin capturing.
    ///
    /// Device denial, device absence, and stream errors all surface as a
    /// `CaptureError` with the controller left Inactive.
    pub fn start(&mut self) -> Result<SessionId, CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let default_cfg = device.default_input_config()?;
        let sample_rate_hz = default_cfg.sample_rate().0;

        let (sample_tx, sample_rx) = mpsc::channel::<Vec<f32>>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<Cmd>();
        let (worker_tx, worker_rx) = mpsc::channel::<WorkerMsg>();

        let worker = std::thread::spawn(move || {
            let config = default_cfg;
            let sample_format = config.sample_format();
            let channels = config.channels() as usize;

            let stream = match sample_format {
                SampleFormat::F32 => {
                    build_input_stream::<f32>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::I16 => {
                    build_input_stream::<i16>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::U16 => {
                    build_input_stream::<u16>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::I8 => {
                    build_input_stream::<i8>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::U8 => {
                    build_input_stream::<u8>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::I32 => {
                    build_input_stream::<i32>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::U32 => {
                    build_input_stream::<u32>(&device, &config.clone().into(), channels, sample_tx)
                }
                SampleFormat::F64 => {
                    build_input_stream::<f64>(&device, &config.clone().into(), channels, sample_tx)
                }
                _ => build_input_stream::<f32>(&device, &config.clone().into(), channels, sample_tx),
            };

            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    let _ = worker_tx.send(WorkerMsg::Error(format!("build stream: {e}")));
                    log::error!("Audio stream build failed: {e}");
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = worker_tx.send(WorkerMsg::Error(format!("play stream: {e}")));
                log::error!("Audio stream play failed: {e}");
                return;
            }

            let _ = worker_tx.send(WorkerMsg::Ready);

            run_consumer(sample_rx, cmd_rx);

            // Returning drops the stream and releases the device.
            drop(stream);
        });

        // Block briefly until the worker has either started the stream or failed.
        match worker_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(WorkerMsg::Ready) => {}
            Ok(WorkerMsg::Error(e)) => {
                let _ = worker.join();
                return Err(CaptureError::Worker(e));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // A worker that comes up after the deadline must still wind
                // down and release the device; it honors Shutdown (or the
                // closed channel) as soon as it starts consuming.
                let _ = cmd_tx.send(Cmd::Shutdown);
                return Err(CaptureError::WorkerTimeout);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(CaptureError::Channel);
            }
        }

        let id = SessionId::new();
        log::info!("recording session {id} started at {sample_rate_hz}Hz");

        self.session = Some(ActiveCapture {
            id,
            started_at: Instant::now(),
            sample_rate_hz,
            cmd_tx,
            worker: Some(worker),
        });

        Ok(id)
    }

    /// Finalize the active session into a single WAV payload.
    ///
    /// The controller is Inactive when this returns, on every path: the
    /// worker is asked to stop, joined, and the stream dropped before the
    /// fragments are concatenated. A session that captured nothing is an
    /// `EmptyCapture` error, not an empty payload.
    pub fn stop(&mut self) -> Result<AudioPayload, CaptureError> {
        let mut cap = self.session.take().ok_or(CaptureError::NotRecording)?;

        let (resp_tx, resp_rx) = mpsc::channel();
        if cap.cmd_tx.send(Cmd::Stop(resp_tx)).is_err() {
            join_worker(&mut cap);
            return Err(CaptureError::Channel);
        }

        let fragments = match resp_rx.recv_timeout(STOP_TIMEOUT) {
            Ok(f) => f,
            Err(e) => {
                let _ = cap.cmd_tx.send(Cmd::Shutdown);
                join_worker(&mut cap);
                return Err(match e {
                    mpsc::RecvTimeoutError::Timeout => CaptureError::StopTimeout,
                    mpsc::RecvTimeoutError::Disconnected => CaptureError::Channel,
                });
            }
        };

        join_worker(&mut cap);

        let samples = concat_fragments(&fragments);
        log::info!(
            "recording session {} stopped: {} fragments, {} samples ({:.1}s at {}Hz)",
            cap.id,
            fragments.len(),
            samples.len(),
            samples.len() as f32 / cap.sample_rate_hz as f32,
            cap.sample_rate_hz
        );

        if samples.is_empty() {
            return Err(CaptureError::EmptyCapture);
        }

        let bytes = encode_wav_mono16(&samples, cap.sample_rate_hz)?;
        Ok(AudioPayload::wav(bytes))
    }
}

impl Default for AudioRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        if let Some(mut cap) = self.session.take() {
            log::warn!(
                "recorder dropped while session {} was live; discarding capture",
                cap.id
            );
            let _ = cap.cmd_tx.send(Cmd::Shutdown);
            join_worker(&mut cap);
        }
    }
}

fn join_worker(cap: &mut ActiveCapture) {
    if let Some(handle) = cap.worker.take() {
        let _ = handle.join();
    }
}

/// Concatenate capture fragments in arrival order.
///
/// The output length is exactly the sum of the fragment lengths; zero
/// fragments concatenate to an empty buffer (rejected upstream).
pub fn concat_fragments(fragments: &[Vec<f32>]) -> Vec<f32> {
    let total = fragments.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for fragment in fragments {
        out.extend_from_slice(fragment);
    }
    out
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    sample_tx: mpsc::Sender<Vec<f32>>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: Sample + SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let cb = move |data: &[T], _: &cpal::InputCallbackInfo| {
        let mut buf = Vec::with_capacity(data.len() / channels.max(1));

        if channels == 1 {
            buf.extend(data.iter().map(|&s| s.to_sample::<f32>()));
        } else {
            for frame in data.chunks_exact(channels) {
                let mono =
                    frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / channels as f32;
                buf.push(mono);
            }
        }

        let _ = sample_tx.send(buf);
    };

    device.build_input_stream(
        config,
        cb,
        |err| {
            // These errors are crucial to debug "recording started but silent".
            log::error!("Audio stream error: {err}");
        },
        None,
    )
}

fn run_consumer(sample_rx: mpsc::Receiver<Vec<f32>>, cmd_rx: mpsc::Receiver<Cmd>) {
    let mut fragments: Vec<Vec<f32>> = Vec::new();

    loop {
        // Always drain commands promptly, even if the stream is stalled.
        loop {
            match cmd_rx.try_recv() {
                Ok(Cmd::Stop(resp)) => {
                    let _ = resp.send(std::mem::take(&mut fragments));
                    return;
                }
                Ok(Cmd::Shutdown) => return,
                // The controller is gone; no Stop can ever arrive, so
                // keeping the stream alive would leak the mic hold.
                Err(mpsc::TryRecvError::Disconnected) => return,
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        match sample_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(chunk) => {
                if !chunk.is_empty() {
                    fragments.push(chunk);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // No audio chunk yet; loop around to check commands again.
                continue;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}
