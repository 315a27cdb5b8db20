// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Getting synthesized audio out of the process, into files and speakers.

pub mod player;
pub mod wav;

pub use player::{CommandPlayer, PlayError, Player};
pub use wav::WavError;
