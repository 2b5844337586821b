//! Audio elements the playback controller drives.
//!
//! `SpeakerAudio` plays MPEG narration through rodio; `SilentAudio` only
//! keeps time, for previewing highlights without sound. Both report
//! started/ended/failed signals on the runtime channel, tagged with the
//! session that produced them.

use crate::runtime::RuntimeEvent;
use narration_core::cancellation::CancellationToken;
use narration_core::{AudioElement, PlaybackError, SessionId};
use rodio::source::SeekError;
use rodio::{Decoder, OutputStream, Sample, Sink, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const END_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub enum NarrationAudio {
    Speaker(SpeakerAudio),
    Silent(SilentAudio),
}

impl AudioElement for NarrationAudio {
    fn play(&mut self, session: SessionId) -> Result<(), PlaybackError> {
        match self {
            NarrationAudio::Speaker(audio) => audio.play(session),
            NarrationAudio::Silent(audio) => audio.play(session),
        }
    }

    fn pause(&mut self) {
        match self {
            NarrationAudio::Speaker(audio) => audio.pause(),
            NarrationAudio::Silent(audio) => audio.pause(),
        }
    }

    fn rewind(&mut self) {
        match self {
            NarrationAudio::Speaker(audio) => audio.rewind(),
            NarrationAudio::Silent(audio) => audio.rewind(),
        }
    }

    fn release(&mut self) {
        match self {
            NarrationAudio::Speaker(audio) => audio.release(),
            NarrationAudio::Silent(audio) => audio.release(),
        }
    }
}

struct SpeakerOutput {
    _stream: OutputStream,
    sink: Arc<Sink>,
}

/// In-memory MPEG narration played on the default output device.
pub struct SpeakerAudio {
    bytes: Arc<[u8]>,
    volume: f32,
    events: Sender<RuntimeEvent>,
    output: Option<SpeakerOutput>,
    watcher: CancellationToken,
}

impl SpeakerAudio {
    pub fn new(bytes: Vec<u8>, volume: f32, events: Sender<RuntimeEvent>) -> Self {
        Self {
            bytes: Arc::from(bytes),
            volume,
            events,
            output: None,
            watcher: CancellationToken::new(),
        }
    }

    fn play(&mut self, session: SessionId) -> Result<(), PlaybackError> {
        if self.bytes.is_empty() {
            return Err(PlaybackError::MissingAudio);
        }
        let (stream, handle) = OutputStream::try_default()
            .map_err(|err| PlaybackError::StartRejected(format!("no audio output: {err}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|err| PlaybackError::StartRejected(format!("creating sink: {err}")))?;
        let source = Decoder::new(Cursor::new(Arc::clone(&self.bytes))).map_err(|err| {
            PlaybackError::StartRejected(format!("cannot decode narration: {err}"))
        })?;

        let produced = Arc::new(AtomicBool::new(false));
        sink.set_volume(self.volume);
        sink.append(TrackedSource::new(source, Arc::clone(&produced)));
        let sink = Arc::new(sink);

        self.watcher = CancellationToken::new();
        let watcher = self.watcher.clone();
        let watched = Arc::clone(&sink);
        let events = self.events.clone();
        thread::Builder::new()
            .name(format!("narration-end-{session}"))
            .spawn(move || watch_for_end(session, watched, produced, watcher, events))
            .map_err(|err| PlaybackError::StartRejected(format!("spawning watcher: {err}")))?;

        sink.play();
        info!(
            session_id = %session,
            bytes = self.bytes.len(),
            volume = self.volume,
            "Narration audio started"
        );
        let _ = self.events.send(RuntimeEvent::Started(session));
        self.output = Some(SpeakerOutput {
            _stream: stream,
            sink,
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(output) = &self.output {
            debug!("Pausing narration");
            output.sink.pause();
        }
    }

    fn rewind(&mut self) {
        if let Some(output) = &self.output {
            if let Err(err) = output.sink.try_seek(Duration::ZERO) {
                debug!("Narration source cannot seek to start: {err:?}");
            }
        }
    }

    fn release(&mut self) {
        self.watcher.cancel();
        if let Some(output) = self.output.take() {
            output.sink.stop();
            debug!("Released narration output");
        }
    }
}

fn watch_for_end(
    session: SessionId,
    sink: Arc<Sink>,
    produced: Arc<AtomicBool>,
    cancel: CancellationToken,
    events: Sender<RuntimeEvent>,
) {
    loop {
        if cancel.wait_timeout(END_POLL_INTERVAL) {
            return;
        }
        if !sink.empty() {
            continue;
        }
        let event = if !produced.load(Ordering::Acquire) {
            warn!(session_id = %session, "Narration produced no playable audio");
            RuntimeEvent::Failed(session, "narration contained no playable audio".to_string())
        } else {
            RuntimeEvent::Ended(session)
        };
        let _ = events.send(event);
        return;
    }
}

/// Passes samples through and records whether any were produced, so a
/// stream that decodes to nothing reports an error instead of a clean end.
struct TrackedSource<S> {
    inner: S,
    produced: Arc<AtomicBool>,
}

impl<S> TrackedSource<S> {
    fn new(inner: S, produced: Arc<AtomicBool>) -> Self {
        Self { inner, produced }
    }
}

impl<S> Iterator for TrackedSource<S>
where
    S: Source,
    S::Item: Sample,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next();
        if sample.is_some() {
            self.produced.store(true, Ordering::Release);
        }
        sample
    }
}

impl<S> Source for TrackedSource<S>
where
    S: Source,
    S::Item: Sample,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.inner.try_seek(pos)
    }
}

/// Clock-only element: "ends" once the estimated narration length elapses.
pub struct SilentAudio {
    duration: Duration,
    events: Sender<RuntimeEvent>,
    clock: CancellationToken,
}

impl SilentAudio {
    pub fn new(duration: Duration, events: Sender<RuntimeEvent>) -> Self {
        Self {
            duration,
            events,
            clock: CancellationToken::new(),
        }
    }

    fn play(&mut self, session: SessionId) -> Result<(), PlaybackError> {
        self.clock = CancellationToken::new();
        let clock = self.clock.clone();
        let events = self.events.clone();
        let duration = self.duration;
        thread::Builder::new()
            .name(format!("silent-narration-{session}"))
            .spawn(move || {
                if !clock.wait_timeout(duration) {
                    let _ = events.send(RuntimeEvent::Ended(session));
                }
            })
            .map_err(|err| PlaybackError::StartRejected(format!("spawning clock: {err}")))?;
        info!(session_id = %session, duration_ms = duration.as_millis(), "Silent narration started");
        let _ = self.events.send(RuntimeEvent::Started(session));
        Ok(())
    }

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn release(&mut self) {
        self.clock.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn silent_audio_signals_start_then_end() {
        let (tx, rx) = mpsc::channel();
        let mut audio = NarrationAudio::Silent(SilentAudio::new(Duration::from_millis(10), tx));
        audio.play(SessionId(5)).unwrap();

        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            RuntimeEvent::Started(SessionId(5))
        ));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            RuntimeEvent::Ended(SessionId(5))
        ));
    }

    #[test]
    fn released_silent_audio_never_ends() {
        let (tx, rx) = mpsc::channel();
        let mut audio = NarrationAudio::Silent(SilentAudio::new(Duration::from_secs(30), tx));
        audio.play(SessionId(1)).unwrap();
        let _ = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        audio.pause();
        audio.rewind();
        audio.release();
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn empty_narration_is_missing_audio() {
        let (tx, rx) = mpsc::channel();
        let mut audio = SpeakerAudio::new(Vec::new(), 1.0, tx);
        assert_eq!(audio.play(SessionId(3)), Err(PlaybackError::MissingAudio));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn undecodable_bytes_are_rejected_or_output_missing() {
        let (tx, rx) = mpsc::channel();
        let mut audio = NarrationAudio::Speaker(SpeakerAudio::new(b"not audio".to_vec(), 1.0, tx));
        let err = audio.play(SessionId(1)).unwrap_err();
        assert!(matches!(err, PlaybackError::StartRejected(_)));
        assert!(rx.try_recv().is_err());
        audio.release();
    }
}
