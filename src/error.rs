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

use log::error;
use std::path::PathBuf;
use zbus::fdo;

#[derive(Debug, thiserror::Error)]
pub enum PhantomError {
    #[error("PhantomError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("PhantomError::IOWrite: An IO error occurred when writing to {file:?}: {e}")]
    IOWrite { file: PathBuf, e: std::io::Error },
    #[error("PhantomError::IOOpen: An IO error occurred when opening {file:?}: {e}")]
    IOOpen { file: PathBuf, e: std::io::Error },
    #[error("PhantomError::IOCopy: An IO error occurred when copying {source_file:?} to {sink:?}: {e}")]
    IOCopy {
        source_file: PathBuf,
        sink: PathBuf,
        e: std::io::Error,
    },
    #[error("PhantomError::Mmap: Failed to map {size:#x} bytes of {file:?}: {e}")]
    Mmap {
        file: PathBuf,
        size: usize,
        e: std::io::Error,
    },
    #[error("PhantomError::ModuleLoad: Failed to load driver module {module:?}: {e}")]
    ModuleLoad { module: String, e: std::io::Error },
    #[error("PhantomError::Version: Unsupported configuration document: {0}")]
    Version(String),
    #[error("PhantomError::Structure: Malformed configuration document: {0}")]
    Structure(String),
    #[error("PhantomError::Capacity: {0}")]
    Capacity(String),
    #[error("PhantomError::AddressRange: {0}")]
    AddressRange(String),
    #[error("PhantomError::MappingConflict: {0}")]
    MappingConflict(String),
    #[error("PhantomError::DeviceNotFound: {0}")]
    DeviceNotFound(String),
    #[error("PhantomError::DeviceOpen: {0}")]
    DeviceOpen(String),
    #[error("PhantomError::PlatformMismatch: {0}")]
    PlatformMismatch(String),
    #[error("PhantomError::Timeout: {0}")]
    Timeout(String),
    #[error("PhantomError::NotConfigured: FPGA DONE is not asserted: {0}")]
    NotConfigured(String),
    #[error("PhantomError::NotInitialised: {0}")]
    NotInitialised(String),
    #[error("PhantomError::Argument: {0}")]
    Argument(String),
    #[error("PhantomError::TomlDe: Failed to parse config {toml_string:?}: {e}")]
    TomlDe {
        toml_string: String,
        e: toml::de::Error,
    },
    #[error("PhantomError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl PhantomError {
    /// `true` for the open/read/write/copy/map failures of any file or device.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            PhantomError::IORead { .. }
                | PhantomError::IOWrite { .. }
                | PhantomError::IOOpen { .. }
                | PhantomError::IOCopy { .. }
                | PhantomError::Mmap { .. }
        )
    }
}

impl From<PhantomError> for fdo::Error {
    fn from(err: PhantomError) -> Self {
        error!("{err}");
        match err {
            PhantomError::Argument(..) => fdo::Error::InvalidArgs(err.to_string()),
            PhantomError::AddressRange(..) => fdo::Error::InvalidArgs(err.to_string()),
            _ if err.is_io() => fdo::Error::IOError(err.to_string()),
            _ => fdo::Error::Failed(err.to_string()),
        }
    }
}
