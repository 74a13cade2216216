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

//! Direct physical memory windows onto fixed SoC control blocks.
//!
//! These are opened for a single register sequence and dropped at its end, which unmaps the
//! window and closes the memory device on every exit path, error paths included.

use crate::error::PhantomError;
use crate::hardware::mapped_region::{MappedRegion, RegisterBlock};
use log::trace;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Source of short-lived register windows at physical addresses.
pub trait PhysicalMemory: Send + Sync {
    /// Map `len` bytes of physical address space starting at `base`.
    fn map_block(&self, base: u64, len: usize) -> Result<Box<dyn RegisterBlock>, PhantomError>;
}

/// [`PhysicalMemory`] backed by the kernel's physical memory device (usually `/dev/mem`).
#[derive(Debug, Clone)]
pub struct DevMem {
    path: PathBuf,
}

impl DevMem {
    pub fn new(path: &Path) -> DevMem {
        DevMem {
            path: path.to_owned(),
        }
    }
}

/// A mapping together with the memory device handle it was made through.
struct PhysicalWindow {
    region: MappedRegion,
    _file: File,
}

impl RegisterBlock for PhysicalWindow {
    fn read32(&self, offset: usize) -> Result<u32, PhantomError> {
        self.region.read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) -> Result<(), PhantomError> {
        self.region.write32(offset, value)
    }
}

impl PhysicalMemory for DevMem {
    fn map_block(&self, base: u64, len: usize) -> Result<Box<dyn RegisterBlock>, PhantomError> {
        trace!("Opening {:?} for physical window {base:#x}+{len:#x}", self.path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|e| PhantomError::IOOpen {
                file: self.path.clone(),
                e,
            })?;
        let region = MappedRegion::map(&file, &self.path, base, len)?;
        Ok(Box::new(PhysicalWindow {
            region,
            _file: file,
        }))
    }
}
