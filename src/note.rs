// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what can be played.

use crate::tuning::{char_offset, Tuning};

/// The notes to be played, in order.
///
/// Either a list of half-step offsets from the reference pitch,
/// or a string where every character denotes one note (see [`char_offset`]).
/// The two forms are never mixed: a source is always entirely one or the other.
///
/// # Examples
///
/// ```
/// use pipspeak::note::*;
///
/// assert_eq!(NoteSource::from(vec![0, 12]).offsets(), vec![0, 12]);
/// assert_eq!(NoteSource::from("9E").offsets(), vec![0, 12]);
/// assert!(NoteSource::from("").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSource {
    /// Explicit half-step offsets.
    Offsets(Vec<i32>),
    /// One note per character.
    Text(String),
}

impl NoteSource {
    /// Number of notes in this source.
    pub fn len(&self) -> usize {
        match self {
            NoteSource::Offsets(offsets) => offsets.len(),
            NoteSource::Text(text) => text.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The half-step offsets of all notes.
    pub fn offsets(&self) -> Vec<i32> {
        match self {
            NoteSource::Offsets(offsets) => offsets.clone(),
            NoteSource::Text(text) => text.chars().map(char_offset).collect(),
        }
    }

    /// The frequency of every note under the given tuning.
    pub fn frequencies(&self, tuning: &Tuning) -> Vec<f64> {
        match self {
            NoteSource::Offsets(offsets) => offsets.iter().map(|&o| tuning.frequency(o)).collect(),
            NoteSource::Text(text) => text.chars().map(|ch| tuning.char_frequency(ch)).collect(),
        }
    }
}

impl Default for NoteSource {
    fn default() -> Self {
        NoteSource::Offsets(Vec::new())
    }
}

impl From<Vec<i32>> for NoteSource {
    fn from(offsets: Vec<i32>) -> Self {
        NoteSource::Offsets(offsets)
    }
}

impl From<&[i32]> for NoteSource {
    fn from(offsets: &[i32]) -> Self {
        NoteSource::Offsets(offsets.to_vec())
    }
}

impl From<String> for NoteSource {
    fn from(text: String) -> Self {
        NoteSource::Text(text)
    }
}

impl From<&str> for NoteSource {
    fn from(text: &str) -> Self {
        NoteSource::Text(text.to_owned())
    }
}
