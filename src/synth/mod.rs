// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting from note data to wave data.

pub mod oscillator;

use log::{debug, trace, warn};

use crate::output::wav::HEADER_LEN;
use crate::wave::SampleBuffer;
use oscillator::SineOscillator;

/// Most frames a synthesis produces, as many 16 bit samples as a wave file can hold.
pub const MAX_FRAMES: usize = (u32::MAX as usize - HEADER_LEN) / 2;

/// Whether `seconds` of audio at `sample_rate` stay within [`MAX_FRAMES`].
///
/// ```
/// use pipspeak::synth::fits_frame_limit;
///
/// assert!(fits_frame_limit(60.0, 44100));
/// assert!(!fits_frame_limit(1e6, 44100));
/// assert!(!fits_frame_limit(std::f64::INFINITY, 44100));
/// ```
pub fn fits_frame_limit(seconds: f64, sample_rate: u32) -> bool {
    !(sample_rate as f64 * seconds > MAX_FRAMES as f64)
}

/// How the sample budget of a synthesis is split across notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBudget {
    /// `floor(sample_rate * seconds)`
    pub total_frames: usize,
    /// `floor(total_frames / notes)`, the remainder is dropped.
    pub frames_per_note: usize,
}

impl FrameBudget {
    /// Compute the budget for `notes` notes played over `seconds`.
    /// Degenerate inputs (no notes, non-positive or NaN duration) yield an empty budget.
    /// Durations beyond [`MAX_FRAMES`] are cut down to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipspeak::synth::FrameBudget;
    ///
    /// let budget = FrameBudget::new(3, 1.0, 44100);
    /// assert_eq!(budget.total_frames, 44100);
    /// assert_eq!(budget.frames_per_note, 14700);
    /// assert!(FrameBudget::new(0, 1.0, 44100).is_empty());
    /// assert!(FrameBudget::new(2, -1.0, 44100).is_empty());
    /// ```
    pub fn new(notes: usize, seconds: f64, sample_rate: u32) -> Self {
        let frames = (sample_rate as f64 * seconds).floor();
        // NaN fails this comparison as well
        let total_frames = if frames > 0.0 {
            if frames > MAX_FRAMES as f64 {
                warn!(
                    "{} frames requested, cutting down to {}",
                    frames, MAX_FRAMES
                );
            }
            frames.min(MAX_FRAMES as f64) as usize
        } else {
            0
        };
        let frames_per_note = if notes == 0 { 0 } else { total_frames / notes };
        Self {
            total_frames,
            frames_per_note,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames_per_note == 0
    }
}

/// Render one sine tone per frequency, one after another, into a single buffer.
///
/// Every tone covers the sample indices `0..=frames_per_note`, so each note
/// contributes `frames_per_note + 1` samples and starts at phase zero.
/// An empty frequency list or an empty duration produce an empty buffer.
///
/// # Examples
///
/// ```
/// use pipspeak::synth::synthesize;
///
/// let buffer = synthesize(&[440.0, 880.0], 1.0, 44100);
/// assert_eq!(buffer.len(), 2 * (22050 + 1));
/// assert!(synthesize(&[], 1.0, 44100).is_empty());
/// assert!(synthesize(&[440.0], 0.0, 44100).is_empty());
/// ```
pub fn synthesize(frequencies: &[f64], seconds: f64, sample_rate: u32) -> SampleBuffer {
    let budget = FrameBudget::new(frequencies.len(), seconds, sample_rate);
    debug!(
        "synthesizing {} notes over {:.3} s at {} Hz ({} frames, {} per note)",
        frequencies.len(),
        seconds,
        sample_rate,
        budget.total_frames,
        budget.frames_per_note
    );
    if budget.is_empty() {
        return SampleBuffer::new();
    }

    let capacity = frequencies
        .len()
        .saturating_mul(budget.frames_per_note.saturating_add(1));
    let mut buffer = SampleBuffer::with_capacity(capacity);
    for &frequency in frequencies {
        let osc = SineOscillator::new(sample_rate as f64, frequency);
        trace!(
            "note at {:.3} Hz, step {:.6} rad",
            frequency,
            osc.angular_step()
        );
        buffer.extend(osc.samples_through(budget.frames_per_note));
    }
    buffer
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::NoteSource;
    use crate::tuning::Tuning;

    /// Number of upward zero crossings, a crude frequency estimate.
    fn rising_crossings(samples: &[i16]) -> usize {
        samples
            .windows(2)
            .filter(|w| w[0] < 0 && w[1] >= 0)
            .count()
    }

    #[test]
    fn single_tone_one_second() {
        let freqs = NoteSource::from(vec![0]).frequencies(&Tuning::default());
        let buffer = synthesize(&freqs, 1.0, 44100);
        assert_eq!(buffer.len(), 44101);
        assert!(buffer.iter().all(|&s| (-32767..=32767).contains(&s)));
        assert_eq!(buffer.peak(), 32767);
        let crossings = rising_crossings(buffer.samples());
        assert!((439..=441).contains(&crossings), "{}", crossings);
    }

    #[test]
    fn two_tones_an_octave_apart() {
        let freqs = NoteSource::from(vec![0, 12]).frequencies(&Tuning::default());
        let buffer = synthesize(&freqs, 2.0, 44100);
        assert_eq!(buffer.len(), 2 * 44101);
        let (first, second) = buffer.samples().split_at(44101);
        assert_eq!(first.len(), second.len());
        let low = rising_crossings(first);
        let high = rising_crossings(second);
        assert!((439..=441).contains(&low), "{}", low);
        assert!((879..=881).contains(&high), "{}", high);
    }

    #[test]
    fn length_within_one_frame_per_note() {
        let rate = 8000;
        for notes in 1..20 {
            for &seconds in &[0.01, 0.3, 1.0, 2.7] {
                let freqs = vec![440.0; notes];
                let len = synthesize(&freqs, seconds, rate).len() as f64;
                let expected = rate as f64 * seconds;
                assert!(
                    (len - expected).abs() <= notes as f64,
                    "{} notes over {} s: {} samples",
                    notes,
                    seconds,
                    len
                );
            }
        }
    }

    #[test]
    fn notes_are_laid_out_in_order() {
        let buffer = synthesize(&[100.0, 200.0, 300.0], 0.5, 600);
        let per_note = 100 + 1;
        assert_eq!(buffer.len(), 3 * per_note);
        for (index, &freq) in [100.0, 200.0, 300.0].iter().enumerate() {
            let osc = SineOscillator::new(600.0, freq);
            assert_eq!(buffer[index * per_note], 0);
            assert_eq!(buffer[index * per_note + 1], osc.sample(1));
        }
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        assert!(synthesize(&[], 1.0, 44100).is_empty());
        assert!(synthesize(&[440.0], 0.0, 44100).is_empty());
        assert!(synthesize(&[440.0], -3.0, 44100).is_empty());
        assert!(synthesize(&[440.0], std::f64::NAN, 44100).is_empty());
        // more notes than frames
        assert!(synthesize(&[440.0; 10], 0.0001, 44100).is_empty());
    }

    #[test]
    fn huge_durations_are_capped() {
        for &seconds in &[1e6, 1e15, std::f64::INFINITY] {
            let budget = FrameBudget::new(3, seconds, 44100);
            assert_eq!(budget.total_frames, MAX_FRAMES);
            assert_eq!(budget.frames_per_note, MAX_FRAMES / 3);
            assert!(!fits_frame_limit(seconds, 44100));
        }
        let budget = FrameBudget::new(usize::MAX, 1e15, 44100);
        assert!(budget.is_empty());
        assert!(fits_frame_limit(3600.0, 44100));
    }
}
