// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `pipspeak` turns a string of characters into robot speak and writes it to a wav file.
//!
//! Every character is one note, measured in half-steps from `9` which is 440 Hz.

use std::path::PathBuf;

use log::info;
use simple_logger;
use structopt::StructOpt;

use pipspeak::stream::{PipStream, StreamConfig, StreamError};

#[derive(Debug, StructOpt)]
#[structopt(name = "pipspeak", about = "Turning characters into robot speak")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Length of the whole utterance in seconds.
    duration: f64,

    /// The notes, one per character.
    data: String,

    /// Output wav file.
    #[structopt(short, long, parse(from_os_str), default_value = "out.wav")]
    output: PathBuf,

    /// Samples per second.
    #[structopt(long, default_value = "44100")]
    rate: u32,

    /// Write a single channel instead of two.
    #[structopt(long)]
    mono: bool,

    /// Play the file with the platform's audio player after writing it.
    #[structopt(long)]
    play: bool,
}

fn main() -> Result<(), StreamError> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).unwrap();

    let config = StreamConfig::default()
        .with_sample_rate(opt.rate)
        .with_channels(if opt.mono { 1 } else { 2 })
        .with_output_path(opt.output);

    if opt.play {
        let mut stream = PipStream::direct_with_platform_player(config)?;
        stream.set(opt.data, opt.duration)?;
    } else {
        let mut stream = PipStream::new(config)?;
        stream.set(opt.data, opt.duration)?;
        stream.write()?;
    }
    info!("done");
    Ok(())
}
