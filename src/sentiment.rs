// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Deriving note sequences from a mood and a personality.
//!
//! A derived sequence is a random walk through a bounded range of half-steps.
//! The walk starts somewhere in the middle third of the range, takes larger
//! steps for personalities further from zero, drifts upwards for positive moods
//! and downwards for negative ones. Its length follows the loquaciousness.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Number of half-steps a derived walk can move through.
pub const SUBSPACE_SIZE: i32 = 36;

/// Mood on a ten point scale, where 5 is neutral, above is positive, below is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 0;
    pub const NEUTRAL: u8 = 5;
    pub const MAX: u8 = 10;

    /// Create a mood, clamping it into the valid scale.
    ///
    /// ```
    /// use pipspeak::sentiment::Mood;
    ///
    /// assert_eq!(Mood::new(7).value(), 7);
    /// assert_eq!(Mood::new(-3).value(), 0);
    /// assert_eq!(Mood::new(42).value(), 10);
    /// ```
    pub fn new(mood: i32) -> Mood {
        Mood(mood.max(Self::MIN as i32).min(Self::MAX as i32) as u8)
    }

    pub fn neutral() -> Mood {
        Mood(Self::NEUTRAL)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Signed tone of the mood, negative for positive moods.
    ///
    /// ```
    /// # use pipspeak::sentiment::Mood;
    /// assert_eq!(Mood::new(5).tone(), 0);
    /// assert_eq!(Mood::new(0).tone(), 6);
    /// assert_eq!(Mood::new(10).tone(), -6);
    /// assert_eq!(Mood::new(7).tone(), -2);
    /// ```
    pub fn tone(self) -> i32 {
        ((Self::NEUTRAL as i32 - self.0 as i32) as f64 * 1.2) as i32
    }

    /// Probability of stepping upwards in a walk.
    fn rise_probability(self) -> f64 {
        (0.5 - self.tone() as f64 / 15.0).max(0.05).min(0.95)
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::neutral()
    }
}

/// Length of a derived note sequence for the given loquaciousness.
///
/// Any positive loquaciousness says at least one note.
///
/// ```
/// # use pipspeak::sentiment::subframe_size;
/// assert_eq!(subframe_size(3.0), 12);
/// assert_eq!(subframe_size(0.6), 2);
/// assert_eq!(subframe_size(0.1), 1);
/// assert_eq!(subframe_size(0.0), 0);
/// ```
pub fn subframe_size(loquaciousness: f64) -> usize {
    if loquaciousness > 0.0 {
        ((loquaciousness * 4.0).floor() as usize).max(1)
    } else {
        0
    }
}

/// Largest step a walk may take for a personality.
fn max_jump(personality: i32) -> i32 {
    (1 + personality.saturating_abs()).min(SUBSPACE_SIZE / 3)
}

/// Turns moods into note sequences using its own random source.
#[derive(Debug, Clone)]
pub struct SentimentModulator {
    rng: Pcg32,
}

impl SentimentModulator {
    /// A modulator that derives the same sequences for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    /// A modulator with a random seed.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    pub fn with_rng(rng: Pcg32) -> Self {
        Self { rng }
    }

    /// Derive a sequence of half-step offsets.
    ///
    /// The sequence has [`subframe_size`]`(loquaciousness)` notes, and all offsets
    /// lie in `depth - SUBSPACE_SIZE / 2 .. depth + SUBSPACE_SIZE / 2`.
    /// Zero loquaciousness yields an empty sequence.
    pub fn derive_notes(
        &mut self,
        mood: Mood,
        personality: i32,
        depth: i32,
        loquaciousness: f64,
    ) -> Vec<i32> {
        let len = subframe_size(loquaciousness);
        let mut notes = Vec::with_capacity(len);
        if len == 0 {
            return notes;
        }

        let third = SUBSPACE_SIZE / 3;
        let jump = max_jump(personality);
        let rise = mood.rise_probability();
        let mut position = third + self.rng.gen_range(0..third);
        notes.push(position);
        while notes.len() < len {
            let step = self.rng.gen_range(1..=jump);
            let step = if self.rng.gen_bool(rise) { step } else { -step };
            position = reflect(position + step);
            notes.push(position);
        }

        log::trace!(
            "derived {:?} for mood {} and personality {}",
            notes,
            mood.value(),
            personality
        );
        let center = SUBSPACE_SIZE / 2;
        notes.iter_mut().for_each(|n| *n += depth - center);
        notes
    }
}

/// Mirror a position back into `0..SUBSPACE_SIZE`.
fn reflect(position: i32) -> i32 {
    if position < 0 {
        -position
    } else if position >= SUBSPACE_SIZE {
        2 * (SUBSPACE_SIZE - 1) - position
    } else {
        position
    }
}
