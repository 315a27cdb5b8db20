// pipspeak -- an expressive sound engine for robot voices
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Writing sample buffers as uncompressed PCM wave files.
//!
//! The layout is the canonical 44 byte RIFF header followed by the samples.
//! Both size fields are written as placeholders first and patched once the
//! body has been written.

use std::convert::TryFrom;
use std::io::{self, BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use snafu::{ensure, ResultExt, Snafu};
use tempfile::NamedTempFile;

use crate::wave::{BitDepth, SampleBuffer, WavFormat};

/// Size of the header in front of the sample data.
pub const HEADER_LEN: usize = 44;

/// Possible errors when writing a wave file.
#[derive(Debug, Snafu)]
pub enum WavError {
    #[snafu(display("Could not create {}: {}", path.display(), source))]
    Create { path: PathBuf, source: io::Error },
    #[snafu(display("Could not write {}: {}", path.display(), source))]
    Encode { path: PathBuf, source: io::Error },
    #[snafu(display("Could not move finished file to {}: {}", path.display(), source))]
    Persist { path: PathBuf, source: io::Error },
    #[snafu(display("Cannot encode {} channels", channels))]
    UnsupportedChannels { channels: u16 },
    #[snafu(display(
        "{} channels of {} bit samples at {} Hz do not fit into a wave header",
        channels,
        bits,
        sample_rate
    ))]
    UnsupportedFormat {
        sample_rate: u32,
        channels: u16,
        bits: u16,
    },
    #[snafu(display("Sample data of {} bytes does not fit into a wave file", bytes))]
    TooLarge { bytes: u64 },
}

fn write_u16<W: Write>(out: &mut W, value: u16) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn patch_u32<W: Write + Seek>(out: &mut W, position: u64, value: u64) -> io::Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "chunk too large"))?;
    out.seek(SeekFrom::Start(position))?;
    write_u32(out, value)
}

/// Encode a complete wave file into `out`, starting at its current position.
///
/// Every sample is written once per channel at the configured bit depth.
/// Returns the number of bytes in the data chunk.
pub fn encode<W: Write + Seek>(
    out: &mut W,
    buffer: &SampleBuffer,
    format: &WavFormat,
) -> io::Result<u32> {
    if format.channels == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "wave files need at least one channel",
        ));
    }
    let (byte_rate, block_align) = format.header_fields().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "byte rate or block align do not fit into a wave header",
        )
    })?;
    let start = out.seek(SeekFrom::Current(0))?;

    out.write_all(b"RIFF----WAVEfmt ")?;
    write_u32(out, 16)?; // no extension data
    write_u16(out, 1)?; // integer PCM
    write_u16(out, format.channels)?;
    write_u32(out, format.sample_rate)?;
    write_u32(out, byte_rate)?;
    write_u16(out, block_align)?;
    write_u16(out, format.bit_depth.bits())?;

    out.write_all(b"data")?;
    let data_size_pos = out.seek(SeekFrom::Current(0))?;
    out.write_all(b"----")?;

    for &sample in buffer.iter() {
        let encoded = format.bit_depth.encode(sample);
        for _ in 0..format.channels {
            out.write_all(encoded.as_slice())?;
        }
    }

    let end = out.seek(SeekFrom::Current(0))?;
    let data_size = end - data_size_pos - 4;
    // The RIFF chunk must have an even size.
    let padded_end = if data_size % 2 == 1 {
        out.write_all(&[0])?;
        end + 1
    } else {
        end
    };
    patch_u32(out, data_size_pos, data_size)?;
    patch_u32(out, start + 4, padded_end - start - 8)?;
    out.seek(SeekFrom::Start(padded_end))?;

    Ok(data_size as u32)
}

/// Encode a complete wave file into memory.
///
/// # Examples
///
/// ```
/// use pipspeak::output::wav;
/// use pipspeak::wave::*;
///
/// let bytes = wav::encode_to_vec(&SampleBuffer::from(vec![0, 1, -1]), &WavFormat::mono(8000)).unwrap();
/// assert_eq!(bytes.len(), 44 + 6);
/// assert_eq!(&bytes[0..4], b"RIFF");
/// assert_eq!(&bytes[36..40], b"data");
/// ```
pub fn encode_to_vec(buffer: &SampleBuffer, format: &WavFormat) -> io::Result<Vec<u8>> {
    let capacity = (buffer.len() as u64 * format.block_align() as u64)
        .min(u32::MAX as u64) as usize
        + HEADER_LEN;
    let mut out = Cursor::new(Vec::with_capacity(capacity));
    encode(&mut out, buffer, format)?;
    Ok(out.into_inner())
}

/// Write a wave file to `path`, replacing whatever was there.
///
/// The file is assembled next to its destination and only moved into place
/// once it is complete, so `path` either holds the old content, the complete
/// new file, or nothing at all.
pub fn write_file(path: &Path, buffer: &SampleBuffer, format: &WavFormat) -> Result<(), WavError> {
    ensure!(
        format.channels > 0,
        UnsupportedChannels {
            channels: format.channels
        }
    );
    ensure!(
        format.header_fields().is_some(),
        UnsupportedFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
            bits: format.bit_depth.bits(),
        }
    );
    let bytes = buffer.len() as u64 * format.block_align() as u64;
    ensure!(
        bytes + HEADER_LEN as u64 <= u32::MAX as u64,
        TooLarge { bytes }
    );

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).context(Create { path })?;
    debug!(
        "encoding {} samples into {}",
        buffer.len(),
        file.path().display()
    );
    {
        let mut out = BufWriter::new(file.as_file_mut());
        encode(&mut out, buffer, format).context(Encode { path })?;
        out.flush().context(Encode { path })?;
    }
    file.persist(path)
        .map_err(|err| err.error)
        .context(Persist { path })?;

    info!(
        "wrote {} ({} samples, {} channel(s), {} Hz, {} bit)",
        path.display(),
        buffer.len(),
        format.channels,
        format.sample_rate,
        format.bit_depth.bits()
    );
    Ok(())
}

/// The format and data size declared by an encoded wave file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: WavFormat,
    /// Declared size of the RIFF chunk, i.e. file size minus 8.
    pub riff_size: u32,
    /// Declared size of the sample data in bytes.
    pub data_size: u32,
}

/// Read back the header of a wave file as produced by [`encode`].
/// Returns `None` if the bytes are not such a file.
pub fn read_header(bytes: &[u8]) -> Option<WavHeader> {
    if bytes.len() < HEADER_LEN
        || &bytes[0..4] != b"RIFF"
        || &bytes[8..16] != b"WAVEfmt "
        || &bytes[36..40] != b"data"
    {
        return None;
    }
    let u16_at = |pos: usize| u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
    let u32_at = |pos: usize| {
        u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
    };
    if u32_at(16) != 16 || u16_at(20) != 1 {
        return None;
    }
    Some(WavHeader {
        format: WavFormat {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            bit_depth: BitDepth::from_bits(u16_at(34))?,
        },
        riff_size: u32_at(4),
        data_size: u32_at(40),
    })
}
