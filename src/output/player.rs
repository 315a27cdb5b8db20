// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Playing finished wave files through an external program.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;
use snafu::{ResultExt, Snafu};

/// Possible errors when playing a file.
#[derive(Debug, Snafu)]
pub enum PlayError {
    #[snafu(display("Could not start {:?}: {}", program, source))]
    Spawn { program: OsString, source: io::Error },
    #[snafu(display("{:?} failed to play {}: {}", program, path.display(), status))]
    Failed {
        program: OsString,
        path: PathBuf,
        status: ExitStatus,
    },
    #[snafu(display("No audio player is known for this platform"))]
    Unsupported,
}

/// Something that can play a wave file.
pub trait Player {
    /// Play the file at `path`, blocking until playback has finished.
    fn play(&mut self, path: &Path) -> Result<(), PlayError>;
}

/// The command line player that ships with the current platform, if any.
pub fn platform_player() -> Option<&'static str> {
    if cfg!(any(target_os = "linux", target_os = "freebsd")) {
        Some("aplay")
    } else if cfg!(target_os = "macos") {
        Some("afplay")
    } else {
        None
    }
}

/// Plays files by running an external program with the file as its last argument.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: Option<OsString>,
    args: Vec<OsString>,
}

impl CommandPlayer {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: Some(program.into()),
            args: Vec::new(),
        }
    }

    /// The platform player, see [`platform_player`].
    /// On platforms without one, every attempt to play fails with [`PlayError::Unsupported`].
    pub fn platform() -> Self {
        Self {
            program: platform_player().map(OsString::from),
            args: Vec::new(),
        }
    }

    /// Add an argument passed before the file name.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::platform()
    }
}

impl Player for CommandPlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlayError> {
        let program = match &self.program {
            Some(program) => program,
            None => return Err(PlayError::Unsupported),
        };
        debug!("playing {} with {:?}", path.display(), program);
        let status = Command::new(program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .context(Spawn { program })?;
        if status.success() {
            Ok(())
        } else {
            Err(PlayError::Failed {
                program: program.clone(),
                path: path.to_path_buf(),
                status,
            })
        }
    }
}

/// A player that does not make any sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Player for Silent {
    fn play(&mut self, _path: &Path) -> Result<(), PlayError> {
        Ok(())
    }
}
