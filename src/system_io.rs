// This file is part of phantom, a user-space hardware abstraction layer for FPGA IP cores on reconfigurable SoC platforms.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// phantom is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// phantom is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Error Wrapping File and Device I/O Helpers
//!
//! Thin wrappers around the standard library file operations used by the HAL, with
//! automatic conversion to [`PhantomError`] and trace logging. Covers sysfs descriptor reads,
//! character device opens and the verbatim image copy into the configuration sink.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use phantom::system_io::{fs_read_token, fs_copy};
//! # use std::path::Path;
//! # fn example() -> Result<(), phantom::error::PhantomError> {
//! let done = fs_read_token(Path::new("/sys/class/xdevcfg/xdevcfg/device/prog_done"))?;
//! let copied = fs_copy(Path::new("/tmp/design.bit"), Path::new("/dev/xdevcfg"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::PhantomError;
use log::trace;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

/// Read the contents of a file to a String.
///
/// # Returns: `Result<String, PhantomError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(PhantomError::IORead)` - If the file cannot be read
pub fn fs_read(file_path: &Path) -> Result<String, PhantomError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(PhantomError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Read a text file whose bytes may not all be valid UTF-8, such as a document written with a
/// Latin-1 comment. Invalid sequences become U+FFFD instead of failing the read.
///
/// # Returns: `Result<String, PhantomError>`
/// * `Ok(String)` - The decoded contents of the file
/// * `Err(PhantomError::IORead)` - If the file cannot be read
pub fn fs_read_lossy(file_path: &Path) -> Result<String, PhantomError> {
    trace!("Attempting to read {file_path:?} as lossy text");
    let bytes = std::fs::read(file_path).map_err(|e| PhantomError::IORead {
        file: file_path.into(),
        e,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the first whitespace-delimited token of a file.
///
/// Kernel descriptor files hold a single value followed by a newline (and sometimes a NUL),
/// e.g. `0x43c00000\n` or `1\n`. An empty file yields an empty string.
pub fn fs_read_token(file_path: &Path) -> Result<String, PhantomError> {
    let contents = fs_read(file_path)?;
    Ok(contents
        .trim_matches('\0')
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Open a character device (or any file) for read/write access without creating it.
///
/// # Returns: `Result<File, PhantomError>`
/// * `Ok(File)` - The open handle; closing happens when it is dropped
/// * `Err(PhantomError::IOOpen)` - Missing node, permissions, etc.
pub fn fs_open_rw(file_path: &Path) -> Result<File, PhantomError> {
    trace!("Attempting to open {file_path:?} read/write");
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(file_path)
        .map_err(|e| PhantomError::IOOpen {
            file: file_path.into(),
            e,
        })
}

/// Copy the whole of `source` byte-for-byte into an existing `sink` (usually a device node).
///
/// Both files are closed before returning, whatever the outcome.
///
/// # Returns: `Result<u64, PhantomError>`
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(PhantomError::IOOpen)` - Either file could not be opened
/// * `Err(PhantomError::IOCopy)` - The transfer failed part-way
pub fn fs_copy(source: &Path, sink: &Path) -> Result<u64, PhantomError> {
    trace!("Attempting to copy {source:?} to {sink:?}");
    let mut input = OpenOptions::new()
        .read(true)
        .open(source)
        .map_err(|e| PhantomError::IOOpen {
            file: source.into(),
            e,
        })?;
    let mut output = OpenOptions::new()
        .write(true)
        .open(sink)
        .map_err(|e| PhantomError::IOOpen {
            file: sink.into(),
            e,
        })?;

    match io::copy(&mut input, &mut output) {
        Ok(n) => {
            trace!("Copied {n} bytes.");
            Ok(n)
        }
        Err(e) => Err(PhantomError::IOCopy {
            source_file: source.into(),
            sink: sink.into(),
            e,
        }),
    }
}
