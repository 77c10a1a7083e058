//! Audio feedback for session start, pause and completion.

use crate::services::SoundPlayer;
use log::warn;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

/// One segment of a generated cue: a frequency (0 for silence) and a length.
type Note = (f32, u64);

/// Rising A5 → C6 chime.
const COMPLETION_CUE: &[Note] = &[(880.0, 150), (0.0, 50), (1046.5, 200)];
/// Short single blip.
const START_CUE: &[Note] = &[(660.0, 120)];
/// Low falling pair.
const PAUSE_CUE: &[Note] = &[(523.25, 90), (0.0, 30), (392.0, 120)];

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Creates a new audio player on the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    fn play(&self, name: &str, cue: &[Note]) {
        if let Err(e) = self.play_cue(cue) {
            warn!("Failed to play {} sound: {}", name, e);
        }
    }

    /// Queues the cue on a detached sink so it plays in the background.
    fn play_cue(&self, cue: &[Note]) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;

        for &(freq, millis) in cue {
            let length = Duration::from_millis(millis);
            if freq > 0.0 {
                sink.append(SineWave::new(freq).take_duration(length).amplify(0.3));
            } else {
                sink.append(Zero::<f32>::new(1, 44100).take_duration(length));
            }
        }
        sink.detach();

        Ok(())
    }
}

impl SoundPlayer for AudioPlayer {
    fn play_completion(&self) {
        self.play("completion", COMPLETION_CUE);
    }

    fn play_start(&self) {
        self.play("start", START_CUE);
    }

    fn play_pause(&self) {
        self.play("pause", PAUSE_CUE);
    }
}
