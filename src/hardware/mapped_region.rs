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

//! Memory-mapped device windows.
//!
//! A [`MappedRegion`] owns its mapping: the only way to touch the memory is through the
//! bounds- and alignment-checked volatile accessors, and dropping the region unmaps it. Nothing
//! can hold a pointer into the window past that point.

use crate::error::PhantomError;
use log::trace;
use memmap2::{MmapMut, MmapOptions};
use std::fs::File;
use std::mem::{align_of, size_of};
use std::path::Path;
use std::ptr::NonNull;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Integer widths that may be read from or written to device memory.
pub trait RegisterWidth: Copy + sealed::Sealed {}
impl RegisterWidth for u8 {}
impl RegisterWidth for u16 {}
impl RegisterWidth for u32 {}
impl RegisterWidth for u64 {}

/// A block of 32-bit control/status registers addressed by byte offset.
pub trait RegisterBlock {
    fn read32(&self, offset: usize) -> Result<u32, PhantomError>;

    fn write32(&self, offset: usize, value: u32) -> Result<(), PhantomError>;
}

pub struct MappedRegion {
    name: String,
    base: NonNull<u8>,
    len: usize,
    // Keeps the mapping alive; all access goes through `base`.
    _map: MmapMut,
}

// The region is plain device memory reached only through volatile accesses.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("name", &self.name)
            .field("len", &format_args!("{:#x}", self.len))
            .finish()
    }
}

impl MappedRegion {
    /// Map `len` bytes of `file`, starting at byte `offset`, shared and read/write.
    ///
    /// `path` is only used for logging and error reporting.
    ///
    /// # Returns: `Result<MappedRegion, PhantomError>`
    /// * `Ok(MappedRegion)` - The live mapping
    /// * `Err(PhantomError::Mmap)` - The kernel refused the mapping
    pub fn map(file: &File, path: &Path, offset: u64, len: usize) -> Result<Self, PhantomError> {
        trace!("Mapping {len:#x} bytes of {path:?} at offset {offset:#x}");
        // SAFETY: the mapping is device memory or a file nobody else truncates while we hold
        // it; every access below is volatile and bounds-checked.
        let mut map = unsafe { MmapOptions::new().offset(offset).len(len).map_mut(file) }
            .map_err(|e| PhantomError::Mmap {
                file: path.into(),
                size: len,
                e,
            })?;
        let base = NonNull::new(map.as_mut_ptr()).ok_or_else(|| {
            PhantomError::Internal(format!("mapping of {path:?} returned a null pointer"))
        })?;
        Ok(MappedRegion {
            name: path.to_string_lossy().into_owned(),
            base,
            len,
            _map: map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_access<T: RegisterWidth>(&self, offset: usize) -> Result<(), PhantomError> {
        let in_bounds = offset
            .checked_add(size_of::<T>())
            .is_some_and(|end| end <= self.len);
        if !in_bounds {
            return Err(PhantomError::AddressRange(format!(
                "offset {offset:#x} (+{} bytes) is outside {} ({:#x} bytes)",
                size_of::<T>(),
                self.name,
                self.len
            )));
        }
        if offset % align_of::<T>() != 0 {
            return Err(PhantomError::AddressRange(format!(
                "offset {offset:#x} is not aligned to {} bytes in {}",
                align_of::<T>(),
                self.name
            )));
        }
        Ok(())
    }

    /// Volatile read of a `T` at byte `offset`.
    pub fn read<T: RegisterWidth>(&self, offset: usize) -> Result<T, PhantomError> {
        self.check_access::<T>(offset)?;
        // SAFETY: bounds and alignment checked above; the mapping lives as long as `self`.
        Ok(unsafe { std::ptr::read_volatile(self.base.as_ptr().add(offset) as *const T) })
    }

    /// Volatile write of a `T` at byte `offset`.
    pub fn write<T: RegisterWidth>(&self, offset: usize, value: T) -> Result<(), PhantomError> {
        self.check_access::<T>(offset)?;
        // SAFETY: as for `read`.
        unsafe { std::ptr::write_volatile(self.base.as_ptr().add(offset) as *mut T, value) };
        Ok(())
    }
}

impl RegisterBlock for MappedRegion {
    fn read32(&self, offset: usize) -> Result<u32, PhantomError> {
        self.read::<u32>(offset)
    }

    fn write32(&self, offset: usize, value: u32) -> Result<(), PhantomError> {
        self.write::<u32>(offset, value)
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        trace!("Unmapping {} ({:#x} bytes)", self.name, self.len);
    }
}
