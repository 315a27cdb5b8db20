// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

// modules for making sounds
pub mod note;
pub mod sentiment;
pub mod synth;
pub mod tuning;
pub mod wave;

// Getting sounds out
pub mod output;
pub mod stream;

pub use note::NoteSource;
pub use sentiment::Mood;
pub use stream::{Capabilities, PipStream, StreamConfig, StreamError, StreamState};
pub use wave::SampleBuffer;
