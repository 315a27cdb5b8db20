// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

use std::convert::TryFrom;
use std::ops;

/// A buffer holding a finished mono waveform as signed 16 bit samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Size of the buffer in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: i16) {
        self.samples.push(sample)
    }

    pub fn clear(&mut self) {
        self.samples.clear()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &i16> {
        self.samples.iter()
    }

    pub fn into_vec(self) -> Vec<i16> {
        self.samples
    }

    /// Largest absolute sample value, zero for an empty buffer.
    pub fn peak(&self) -> i16 {
        self.samples
            .iter()
            .map(|s| s.saturating_abs())
            .max()
            .unwrap_or(0)
    }
}

impl From<Vec<i16>> for SampleBuffer {
    fn from(samples: Vec<i16>) -> Self {
        Self { samples }
    }
}

impl Extend<i16> for SampleBuffer {
    fn extend<I: IntoIterator<Item = i16>>(&mut self, iter: I) {
        self.samples.extend(iter)
    }
}

impl ops::Index<usize> for SampleBuffer {
    type Output = i16;

    fn index(&self, index: usize) -> &i16 {
        &self.samples[index]
    }
}

/// Number of bits used for each sample in an encoded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    pub fn bytes(self) -> u16 {
        self.bits() / 8
    }

    pub fn from_bits(bits: u16) -> Option<BitDepth> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            24 => Some(BitDepth::TwentyFour),
            32 => Some(BitDepth::ThirtyTwo),
            _ => None,
        }
    }

    /// Little-endian bytes of a 16 bit sample rescaled to this depth.
    /// 8 bit samples are unsigned with a bias of 128.
    ///
    /// ```
    /// use pipspeak::wave::*;
    ///
    /// assert_eq!(BitDepth::Eight.encode(0).as_slice(), &[128]);
    /// assert_eq!(BitDepth::Sixteen.encode(-2).as_slice(), &[0xfe, 0xff]);
    /// assert_eq!(BitDepth::TwentyFour.encode(1).as_slice(), &[0, 1, 0]);
    /// ```
    pub fn encode(self, sample: i16) -> EncodedSample {
        match self {
            BitDepth::Eight => EncodedSample::new(&[((sample >> 8) + 128) as u8]),
            BitDepth::Sixteen => EncodedSample::new(&sample.to_le_bytes()),
            BitDepth::TwentyFour => EncodedSample::new(&((sample as i32) << 8).to_le_bytes()[..3]),
            BitDepth::ThirtyTwo => EncodedSample::new(&((sample as i32) << 16).to_le_bytes()),
        }
    }
}

/// The bytes of one sample at some bit depth, at most four.
#[derive(Debug, Clone, Copy)]
pub struct EncodedSample {
    bytes: [u8; 4],
    len: usize,
}

impl EncodedSample {
    fn new(src: &[u8]) -> Self {
        let mut bytes = [0; 4];
        bytes[..src.len()].copy_from_slice(src);
        Self {
            bytes,
            len: src.len(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Information about how audio is laid out in an encoded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of samples per second.
    pub sample_rate: u32,
    /// Every sample is duplicated onto each channel.
    pub channels: u16,
    pub bit_depth: BitDepth,
}

impl WavFormat {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bit_depth: BitDepth::Sixteen,
        }
    }

    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            channels: 2,
            ..Self::mono(sample_rate)
        }
    }

    /// Bytes per second of audio.
    ///
    /// ```
    /// # use pipspeak::wave::*;
    /// assert_eq!(WavFormat::stereo(44100).byte_rate(), 176400);
    /// assert_eq!(WavFormat::mono(44100).byte_rate(), 88200);
    /// assert_eq!(WavFormat::stereo(400_000_000).byte_rate(), 1_600_000_000);
    /// ```
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.bit_depth.bits() as u64 * self.channels as u64 / 8
    }

    /// Bytes per frame across all channels.
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * self.bit_depth.bytes() as u32
    }

    /// Byte rate and block align as stored in a wave header,
    /// or `None` if they overflow their 32 and 16 bit fields.
    ///
    /// ```
    /// # use pipspeak::wave::*;
    /// assert_eq!(WavFormat::mono(8000).header_fields(), Some((16000, 2)));
    /// let wide = WavFormat { channels: 40000, ..WavFormat::mono(8000) };
    /// assert_eq!(wide.header_fields(), None);
    /// let fast = WavFormat { bit_depth: BitDepth::ThirtyTwo, ..WavFormat::stereo(u32::MAX) };
    /// assert_eq!(fast.header_fields(), None);
    /// ```
    pub fn header_fields(&self) -> Option<(u32, u16)> {
        let byte_rate = u32::try_from(self.byte_rate()).ok()?;
        let block_align = u16::try_from(self.block_align()).ok()?;
        Some((byte_rate, block_align))
    }
}
