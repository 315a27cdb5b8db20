// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

/// One full turn in radians.
///
/// Oscillators take it from here when computing their angular step,
/// there is no shared mutable state behind it.
pub const TWO_PI: f64 = std::f64::consts::TAU;

/// Full scale amplitude of a signed 16 bit sample.
pub const FULL_SCALE: f64 = 32767.0;

/// A sine oscillator sampling a fixed frequency at a fixed sample rate.
///
/// Sample `i` is `round(sin(i * step) * 32767)` where `step = 2π f / sample_rate`,
/// so every note starts at phase zero.
#[derive(Debug, Clone, Copy)]
pub struct SineOscillator {
    angular_step: f64,
}

impl SineOscillator {
    pub fn new(sample_rate: f64, frequency: f64) -> Self {
        Self {
            angular_step: (TWO_PI * frequency) / sample_rate,
        }
    }

    /// Radians advanced per sample.
    pub fn angular_step(&self) -> f64 {
        self.angular_step
    }

    pub fn sample(&self, index: usize) -> i16 {
        let amp = (index as f64 * self.angular_step).sin();
        (amp * FULL_SCALE).round() as i16
    }

    /// Iterate over the samples `0..=last`.
    pub fn samples_through(&self, last: usize) -> impl Iterator<Item = i16> + '_ {
        (0..=last).map(move |i| self.sample(i))
    }
}
