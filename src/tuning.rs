// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Mapping notes to frequencies.

/// Frequency of the note at offset zero.
pub const REFERENCE_FREQUENCY: f64 = 440.0;

/// Ratio between two adjacent half-steps.
/// This is a fixed approximation of the twelfth root of two, and it must stay that way:
/// generated waveforms are expected to match this exact constant.
pub const SEMITONE_RATIO: f64 = 1.059463094359;

/// Character code that maps to offset zero in text notes.
pub const CHAR_OFFSET_BASE: i32 = 57;

/// Defines the tuning by assigning a frequency to offset zero.
/// All other notes are derived with 12 equal half-steps per octave.
///
/// # Examples
///
/// ```
/// use pipspeak::tuning::*;
/// assert_eq!(Tuning::default().frequency(0), 440.0);
/// assert!((Tuning::default().frequency(12) - 880.0).abs() < 1e-6);
/// assert!((Tuning::default().frequency(-12) - 220.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub reference_frequency: f64,
    pub semitone_ratio: f64,
}

impl Tuning {
    /// Return the frequency of a note given as half-steps relative to the reference.
    /// Offsets are not range checked, extreme values simply yield extreme frequencies.
    pub fn frequency(&self, offset: i32) -> f64 {
        self.reference_frequency * self.semitone_ratio.powi(offset)
    }

    /// Return the frequency of a note written as a character.
    pub fn char_frequency(&self, ch: char) -> f64 {
        self.frequency(char_offset(ch))
    }
}

/// Concert tuning, where offset zero corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_frequency: REFERENCE_FREQUENCY,
            semitone_ratio: SEMITONE_RATIO,
        }
    }
}

/// The half-step offset denoted by a character in a text note.
///
/// ```
/// # use pipspeak::tuning::*;
/// assert_eq!(char_offset('9'), 0);
/// assert_eq!(char_offset('0'), -9);
/// assert_eq!(char_offset('E'), 12);
/// ```
pub fn char_offset(ch: char) -> i32 {
    ch as i32 - CHAR_OFFSET_BASE
}
