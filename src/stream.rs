// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Streams turn notes into finished waveforms and, on demand, into files.
//!
//! There is a single stream type whose behavior is selected by [`Capabilities`]:
//!
//! - a *plain* stream only synthesizes into memory,
//! - a *direct* stream additionally writes every synthesis to its output file
//!   and plays that file through a [`Player`],
//! - an *advanced* stream can derive its notes from a mood via [`PipStream::speak`].

use std::path::{Path, PathBuf};

use log::{debug, warn};
use snafu::{ensure, ResultExt, Snafu};

use crate::note::NoteSource;
use crate::output::player::{CommandPlayer, PlayError, Player, Silent};
use crate::output::wav::{self, WavError};
use crate::sentiment::{Mood, SentimentModulator};
use crate::synth::{fits_frame_limit, synthesize};
use crate::tuning::Tuning;
use crate::wave::{BitDepth, SampleBuffer, WavFormat};

/// Where streams write their audio unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "out.wav";

/// Possible errors when using a stream.
#[derive(Debug, Snafu)]
pub enum StreamError {
    #[snafu(display("Invalid stream configuration: {}", reason))]
    InvalidConfig { reason: String },
    #[snafu(display("{}", source))]
    Output { source: WavError },
    #[snafu(display("This stream does not derive notes from sentiment"))]
    NotSentimentDriven,
    #[snafu(display("{} seconds of audio do not fit into a wave file", seconds))]
    TooLong { seconds: f64 },
}

/// Per-stream parameters.
///
/// # Examples
///
/// ```
/// use pipspeak::stream::StreamConfig;
///
/// let config = StreamConfig::default().with_personality(4).with_loquaciousness(1.5);
/// assert_eq!(config.sample_rate, 44100);
/// assert!(config.smoothing);
/// assert_eq!(config.personality, 4);
/// assert_eq!(config.depth, 0);
/// assert_eq!(config.effective_loquaciousness(), 1.5);
/// assert_eq!(config.with_muted(true).effective_loquaciousness(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Samples per second.
    pub sample_rate: u32,
    /// Smoothing of note transitions. Kept as state only, it does not alter the waveform.
    pub smoothing: bool,
    /// How eccentric derived voices are, 0 being the most even.
    pub personality: i32,
    /// Half-steps added to every derived note.
    pub depth: i32,
    /// How many notes a derived voice says, 4 per unit.
    pub loquaciousness: f64,
    pub muted: bool,
    /// Seed for deriving notes, random if not given.
    pub seed: Option<u64>,
    pub output_path: PathBuf,
    pub channels: u16,
    pub bit_depth: BitDepth,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            smoothing: true,
            personality: 2,
            depth: 0,
            loquaciousness: 3.0,
            muted: false,
            seed: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            channels: 1,
            bit_depth: BitDepth::Sixteen,
        }
    }
}

impl StreamConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_personality(mut self, personality: i32) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_loquaciousness(mut self, loquaciousness: f64) -> Self {
        self.loquaciousness = loquaciousness;
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Loquaciousness after muting, zero while muted.
    pub fn effective_loquaciousness(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.loquaciousness
        }
    }

    /// Layout of the files written with this configuration.
    pub fn format(&self) -> WavFormat {
        WavFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bit_depth: self.bit_depth,
        }
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        ensure!(
            self.sample_rate > 0,
            InvalidConfig {
                reason: "sample rate must be positive"
            }
        );
        ensure!(
            self.channels > 0,
            InvalidConfig {
                reason: "at least one channel is required"
            }
        );
        ensure!(
            self.format().header_fields().is_some(),
            InvalidConfig {
                reason: format!(
                    "{} channels at {} Hz overflow the wave header",
                    self.channels, self.sample_rate
                )
            }
        );
        ensure!(
            self.loquaciousness.is_finite() && self.loquaciousness >= 0.0,
            InvalidConfig {
                reason: format!(
                    "loquaciousness {} is not a finite non-negative number",
                    self.loquaciousness
                )
            }
        );
        Ok(())
    }
}

/// What a stream does besides synthesizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Write every synthesis to the output file and play it.
    pub auto_play_after_write: bool,
    /// Allow deriving notes from a mood.
    pub notes_from_sentiment: bool,
}

impl Capabilities {
    pub const PLAIN: Capabilities = Capabilities {
        auto_play_after_write: false,
        notes_from_sentiment: false,
    };
    pub const DIRECT: Capabilities = Capabilities {
        auto_play_after_write: true,
        notes_from_sentiment: false,
    };
    pub const ADVANCED: Capabilities = Capabilities {
        auto_play_after_write: false,
        notes_from_sentiment: true,
    };
}

/// Where a stream is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No notes were given yet.
    Idle,
    /// Notes are known but there is no waveform for them.
    Configured,
    /// The waveform for the current notes is available.
    Synthesized,
}

/// A stream of notes rendered into a sine voice.
pub struct PipStream {
    config: StreamConfig,
    capabilities: Capabilities,
    tuning: Tuning,
    notes: Option<NoteSource>,
    buffer: SampleBuffer,
    synthesized: bool,
    modulator: SentimentModulator,
    player: Box<dyn Player>,
    last_playback_error: Option<PlayError>,
}

impl PipStream {
    /// A stream that only synthesizes into memory.
    pub fn new(config: StreamConfig) -> Result<Self, StreamError> {
        Self::with_capabilities(config, Capabilities::PLAIN, Box::new(Silent))
    }

    /// A stream that writes each synthesis to its output path and plays it with `player`.
    pub fn direct<P: Player + 'static>(config: StreamConfig, player: P) -> Result<Self, StreamError> {
        Self::with_capabilities(config, Capabilities::DIRECT, Box::new(player))
    }

    /// A direct stream using the platform's command line player.
    pub fn direct_with_platform_player(config: StreamConfig) -> Result<Self, StreamError> {
        Self::direct(config, CommandPlayer::platform())
    }

    /// A stream that can derive its notes from a mood.
    pub fn advanced(config: StreamConfig) -> Result<Self, StreamError> {
        Self::with_capabilities(config, Capabilities::ADVANCED, Box::new(Silent))
    }

    pub fn with_capabilities(
        config: StreamConfig,
        capabilities: Capabilities,
        player: Box<dyn Player>,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let modulator = match config.seed {
            Some(seed) => SentimentModulator::seeded(seed),
            None => SentimentModulator::from_entropy(),
        };
        Ok(Self {
            config,
            capabilities,
            tuning: Tuning::default(),
            notes: None,
            buffer: SampleBuffer::new(),
            synthesized: false,
            modulator,
            player,
            last_playback_error: None,
        })
    }

    /// Replace the notes and synthesize them over `seconds`.
    ///
    /// Any previous waveform is discarded. Empty notes or a non-positive duration
    /// result in an empty waveform. Direct streams also write and play the result;
    /// only a failed write is reported as an error.
    pub fn set<N: Into<NoteSource>>(&mut self, notes: N, seconds: f64) -> Result<(), StreamError> {
        self.check_duration(seconds)?;
        self.notes = Some(notes.into());
        self.render(seconds)
    }

    /// Derive notes from `mood` and synthesize them over `seconds`.
    pub fn speak(&mut self, mood: Mood, seconds: f64) -> Result<(), StreamError> {
        ensure!(self.capabilities.notes_from_sentiment, NotSentimentDriven);
        self.check_duration(seconds)?;
        let offsets = self.derive_notes(mood);
        self.notes = Some(NoteSource::Offsets(offsets));
        self.render(seconds)
    }

    /// Derive a note sequence for `mood` from the current personality, depth and loquaciousness.
    /// A muted stream derives an empty sequence.
    pub fn derive_notes(&mut self, mood: Mood) -> Vec<i32> {
        self.modulator.derive_notes(
            mood,
            self.config.personality,
            self.config.depth,
            self.config.effective_loquaciousness(),
        )
    }

    fn check_duration(&self, seconds: f64) -> Result<(), StreamError> {
        ensure!(
            fits_frame_limit(seconds, self.config.sample_rate),
            TooLong { seconds }
        );
        Ok(())
    }

    fn render(&mut self, seconds: f64) -> Result<(), StreamError> {
        let frequencies = match &self.notes {
            Some(notes) => notes.frequencies(&self.tuning),
            None => Vec::new(),
        };
        self.buffer = synthesize(&frequencies, seconds, self.config.sample_rate);
        self.synthesized = true;
        debug!("stream holds {} samples", self.buffer.len());

        if self.capabilities.auto_play_after_write {
            let path = self.config.output_path.clone();
            self.write_to_file(&path)?;
            self.last_playback_error = match self.player.play(&path) {
                Ok(()) => None,
                Err(err) => {
                    warn!("{} was written but could not be played: {}", path.display(), err);
                    Some(err)
                }
            };
        }
        Ok(())
    }

    /// A copy of the current waveform.
    pub fn get(&self) -> SampleBuffer {
        self.buffer.clone()
    }

    /// Drop the waveform, keeping the notes.
    pub fn empty(&mut self) {
        self.buffer.clear();
        self.synthesized = false;
    }

    pub fn state(&self) -> StreamState {
        match (&self.notes, self.synthesized) {
            (None, _) => StreamState::Idle,
            (Some(_), false) => StreamState::Configured,
            (Some(_), true) => StreamState::Synthesized,
        }
    }

    pub fn notes(&self) -> Option<&NoteSource> {
        self.notes.as_ref()
    }

    /// Write the current waveform to the configured output path.
    pub fn write(&self) -> Result<(), StreamError> {
        self.write_to_file(&self.config.output_path)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), StreamError> {
        wav::write_file(path, &self.buffer, &self.config.format()).context(Output)
    }

    /// Why the last automatic playback failed, if it did.
    pub fn last_playback_error(&self) -> Option<&PlayError> {
        self.last_playback_error.as_ref()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn smoothing(&self) -> bool {
        self.config.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: bool) {
        self.config.smoothing = smoothing;
    }

    pub fn toggle_smoothing(&mut self) {
        self.config.smoothing = !self.config.smoothing;
    }

    pub fn set_personality(&mut self, personality: i32) {
        self.config.personality = personality;
    }

    pub fn set_depth(&mut self, depth: i32) {
        self.config.depth = depth;
    }

    /// Set the loquaciousness, negative or non-finite values count as zero.
    pub fn set_loquaciousness(&mut self, loquaciousness: f64) {
        self.config.loquaciousness = if loquaciousness.is_finite() {
            loquaciousness.max(0.0)
        } else {
            0.0
        };
    }

    /// Silence derived voices until [`unmute`](Self::unmute) is called.
    pub fn mute(&mut self) {
        self.config.muted = true;
    }

    pub fn unmute(&mut self) {
        self.config.muted = false;
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Remembers every path it was asked to play.
    #[derive(Clone, Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl Player for Recorder {
        fn play(&mut self, path: &Path) -> Result<(), PlayError> {
            assert!(path.exists(), "played before writing");
            self.played.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Broken;

    impl Player for Broken {
        fn play(&mut self, _path: &Path) -> Result<(), PlayError> {
            Err(PlayError::Unsupported)
        }
    }

    fn plain() -> PipStream {
        PipStream::new(StreamConfig::default()).unwrap()
    }

    #[test]
    fn lifecycle() {
        let mut stream = plain();
        assert_eq!(stream.state(), StreamState::Idle);
        assert!(stream.get().is_empty());

        stream.set(vec![0], 1.0).unwrap();
        assert_eq!(stream.state(), StreamState::Synthesized);
        assert_eq!(stream.get().len(), 44101);

        stream.empty();
        assert_eq!(stream.state(), StreamState::Configured);
        assert!(stream.get().is_empty());
        assert_eq!(stream.notes(), Some(&NoteSource::from(vec![0])));
    }

    #[test]
    fn set_replaces_previous_waveform() {
        let mut stream = plain();
        stream.set(vec![0, 3, 7], 1.0).unwrap();
        stream.set("9", 0.5).unwrap();
        let mut fresh = plain();
        fresh.set(vec![0], 0.5).unwrap();
        assert_eq!(stream.get(), fresh.get());
        assert_eq!(stream.notes(), Some(&NoteSource::from("9")));
    }

    #[test]
    fn get_returns_a_copy() {
        let mut stream = plain();
        stream.set(vec![0], 0.01).unwrap();
        let copy = stream.get();
        stream.empty();
        assert!(!copy.is_empty());
    }

    #[test]
    fn empty_notes_give_empty_waveform() {
        let mut stream = plain();
        stream.set(Vec::<i32>::new(), 1.0).unwrap();
        assert!(stream.get().is_empty());
        stream.set("", 1.0).unwrap();
        assert!(stream.get().is_empty());
        stream.set(vec![1, 2], -1.0).unwrap();
        assert!(stream.get().is_empty());
        assert_eq!(stream.state(), StreamState::Synthesized);
    }

    #[test]
    fn smoothing_is_only_state() {
        let mut stream = plain();
        assert!(stream.smoothing());
        stream.set(vec![0, 5], 0.2).unwrap();
        let smooth = stream.get();
        stream.toggle_smoothing();
        assert!(!stream.smoothing());
        stream.set(vec![0, 5], 0.2).unwrap();
        assert_eq!(stream.get(), smooth);
        stream.set_smoothing(true);
        assert!(stream.smoothing());
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(matches!(
            PipStream::new(StreamConfig::default().with_sample_rate(0)),
            Err(StreamError::InvalidConfig { .. })
        ));
        assert!(matches!(
            PipStream::new(StreamConfig::default().with_loquaciousness(std::f64::NAN)),
            Err(StreamError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_formats_overflowing_the_header() {
        let fast = StreamConfig::default()
            .with_sample_rate(u32::MAX)
            .with_bit_depth(BitDepth::ThirtyTwo);
        assert!(matches!(
            PipStream::new(fast),
            Err(StreamError::InvalidConfig { .. })
        ));
        assert!(matches!(
            PipStream::new(StreamConfig::default().with_channels(40000)),
            Err(StreamError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn high_sample_rates_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fast.wav");
        let config = StreamConfig::default()
            .with_sample_rate(400_000_000)
            .with_channels(2);
        let stream = PipStream::new(config).unwrap();
        stream.write_to_file(&path).unwrap();
        let header = wav::read_header(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(header.format.byte_rate(), 1_600_000_000);
        assert_eq!(header.data_size, 0);
    }

    #[test]
    fn rejects_durations_beyond_a_wave_file() {
        let mut stream = plain();
        let err = stream.set(vec![0], 1e15).unwrap_err();
        assert!(matches!(err, StreamError::TooLong { .. }), "{}", err);
        assert_eq!(stream.state(), StreamState::Idle);
        assert!(stream.notes().is_none());

        let mut stream = PipStream::advanced(StreamConfig::default()).unwrap();
        assert!(matches!(
            stream.speak(Mood::neutral(), std::f64::INFINITY),
            Err(StreamError::TooLong { .. })
        ));
    }

    #[test]
    fn direct_stream_writes_then_plays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let recorder = Recorder::default();
        let config = StreamConfig::default().with_output_path(&path);
        let mut stream = PipStream::direct(config, recorder.clone()).unwrap();

        stream.set("9E", 0.1).unwrap();
        assert_eq!(*recorder.played.borrow(), vec![path.clone()]);
        assert!(stream.last_playback_error().is_none());

        let bytes = std::fs::read(&path).unwrap();
        let header = wav::read_header(&bytes).unwrap();
        assert_eq!(header.data_size as usize, stream.get().len() * 2);
    }

    #[test]
    fn playback_failure_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let config = StreamConfig::default().with_output_path(&path);
        let mut stream = PipStream::direct(config, Broken).unwrap();

        stream.set(vec![0], 0.1).unwrap();
        assert!(path.exists());
        assert!(matches!(
            stream.last_playback_error(),
            Some(PlayError::Unsupported)
        ));
    }

    #[test]
    fn direct_write_failure_skips_playback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.wav");
        let recorder = Recorder::default();
        let config = StreamConfig::default().with_output_path(&path);
        let mut stream = PipStream::direct(config, recorder.clone()).unwrap();

        let err = stream.set(vec![0], 0.1).unwrap_err();
        assert!(matches!(err, StreamError::Output { .. }), "{}", err);
        assert!(recorder.played.borrow().is_empty());
        assert!(!path.exists());
        // the waveform itself is still available
        assert!(!stream.get().is_empty());
    }

    #[test]
    fn plain_stream_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StreamConfig::default().with_output_path(dir.path().join("out.wav"));
        let mut stream = PipStream::new(config).unwrap();
        stream.set(vec![0], 0.1).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        stream.write().unwrap();
        assert!(dir.path().join("out.wav").exists());
    }

    #[test]
    fn writes_configured_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let config = StreamConfig::default()
            .with_channels(2)
            .with_sample_rate(22050);
        let mut stream = PipStream::new(config).unwrap();
        stream.set(vec![0, 12], 0.5).unwrap();
        stream.write_to_file(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.len() as usize, stream.get().len() * 2);
    }

    #[test]
    fn only_advanced_streams_speak() {
        let mut stream = plain();
        assert!(matches!(
            stream.speak(Mood::neutral(), 1.0),
            Err(StreamError::NotSentimentDriven)
        ));
    }

    #[test]
    fn advanced_stream_speaks() {
        let config = StreamConfig::default().with_seed(42);
        let mut stream = PipStream::advanced(config.clone()).unwrap();
        stream.speak(Mood::new(8), 1.5).unwrap();
        let notes = stream.notes().unwrap().offsets();
        assert_eq!(notes.len(), 12);
        // 66150 frames split across 12 notes
        assert_eq!(stream.get().len(), 12 * (5512 + 1));

        let mut twin = PipStream::advanced(config).unwrap();
        twin.speak(Mood::new(8), 1.5).unwrap();
        assert_eq!(twin.get(), stream.get());
    }

    #[test]
    fn mute_silences_derived_voice() {
        let mut stream = PipStream::advanced(StreamConfig::default().with_seed(1)).unwrap();
        stream.mute();
        assert!(stream.is_muted());
        assert!(stream.derive_notes(Mood::new(9)).is_empty());
        stream.speak(Mood::new(9), 1.0).unwrap();
        assert!(stream.get().is_empty());

        stream.unmute();
        assert_eq!(stream.derive_notes(Mood::new(9)).len(), 12);
    }

    #[test]
    fn setters_shape_derived_notes() {
        let mut stream = PipStream::advanced(StreamConfig::default().with_seed(5)).unwrap();
        stream.set_loquaciousness(0.5);
        assert_eq!(stream.derive_notes(Mood::neutral()).len(), 2);
        stream.set_loquaciousness(-3.0);
        assert!(stream.derive_notes(Mood::neutral()).is_empty());

        stream.set_loquaciousness(2.0);
        stream.set_personality(0);
        stream.set_depth(30);
        let notes = stream.derive_notes(Mood::neutral());
        assert_eq!(notes.len(), 8);
        assert!(notes.iter().all(|&n| n >= 12 && n < 48), "{:?}", notes);
        assert!(notes.windows(2).all(|w| (w[1] - w[0]).abs() == 1));
    }
}
