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

//! The UIO device slot pool.
//!
//! Every IP core's AXI slave window is reached through one of [`NUM_UIO_DEVS`] UIO nodes. The
//! registry opens all of them up front, then serves [`map`](DeviceRegistry::map) requests by
//! matching the requested bus address against each slot's advertised `maps/map0/addr`.
//!
//! A slot can be mapped once per open. After [`unmap_all`](DeviceRegistry::unmap_all) the slot
//! stays marked as mapped; only [`close_all`](DeviceRegistry::close_all) followed by
//! [`open_all`](DeviceRegistry::open_all) makes it available again.

use crate::error::PhantomError;
use crate::hardware::mapped_region::MappedRegion;
use crate::hardware::poll::Delay;
use crate::system_io::{fs_open_rw, fs_read_token};
use crate::topology::ComponentDescriptor;
use log::{debug, info, trace, warn};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

pub const NUM_UIO_DEVS: usize = 32;

/// AXI general purpose master port 0 window.
pub const GP0_MIN: u64 = 0x4000_0000;
pub const GP0_MAX: u64 = 0x4f00_0000;
/// AXI general purpose master port 1 window.
pub const GP1_MIN: u64 = 0x8000_0000;
pub const GP1_MAX: u64 = 0x8f00_0000;
/// Largest slave window a single core may expose.
pub const MAX_WINDOW_SIZE: u64 = 0x100_0000;

/// Check that `base_address` lies in one of the GP windows and `size` is not oversized.
///
/// # Returns: `Result<(), PhantomError>`
/// * `Ok(())` - The window can be requested
/// * `Err(PhantomError::AddressRange)` - Address outside GP0/GP1 or size above [`MAX_WINDOW_SIZE`]
pub fn validate_window(base_address: u64, size: u64) -> Result<(), PhantomError> {
    let outside = base_address < GP0_MIN
        || (base_address > GP0_MAX && base_address < GP1_MIN)
        || base_address >= GP1_MAX;
    if outside {
        return Err(PhantomError::AddressRange(format!(
            "bus address {base_address:#x} is outside the GP0 ({GP0_MIN:#x}..={GP0_MAX:#x}) and GP1 ({GP1_MIN:#x}..{GP1_MAX:#x}) windows"
        )));
    }
    if size > MAX_WINDOW_SIZE {
        return Err(PhantomError::AddressRange(format!(
            "window size {size:#x} at {base_address:#x} exceeds the maximum of {MAX_WINDOW_SIZE:#x}"
        )));
    }
    Ok(())
}

/// Naming convention of the UIO nodes and their sysfs descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePaths {
    /// Node path without the slot number, e.g. `/dev/uio`.
    pub device_prefix: String,
    /// Directory holding one `uioN` entry per node, e.g. `/sys/class/uio/`.
    pub sysfs_dir: PathBuf,
}

impl DevicePaths {
    pub fn device_node(&self, slot: usize) -> PathBuf {
        PathBuf::from(format!("{}{slot}", self.device_prefix))
    }

    pub fn map_addr_file(&self, slot: usize) -> PathBuf {
        self.map_dir(slot).join("addr")
    }

    pub fn map_size_file(&self, slot: usize) -> PathBuf {
        self.map_dir(slot).join("size")
    }

    fn map_dir(&self, slot: usize) -> PathBuf {
        self.sysfs_dir.join(format!("uio{slot}/maps/map0"))
    }
}

/// Recovery action run when the UIO nodes cannot be opened.
pub trait ModuleLoader: Send + Sync {
    fn load_driver(&self) -> Result<(), PhantomError>;
}

/// Loads the UIO driver with `modprobe`.
#[derive(Debug, Clone)]
pub struct ModprobeLoader {
    /// Module name followed by its parameters, whitespace separated.
    module: String,
}

impl ModprobeLoader {
    pub fn new(module: &str) -> ModprobeLoader {
        ModprobeLoader {
            module: module.to_string(),
        }
    }
}

impl ModuleLoader for ModprobeLoader {
    fn load_driver(&self) -> Result<(), PhantomError> {
        let mut words = self.module.split_whitespace();
        let Some(name) = words.next() else {
            return Err(PhantomError::Argument(
                "no driver module configured".to_string(),
            ));
        };
        info!("Loading driver module: modprobe {}", self.module);
        let output = Command::new("modprobe")
            .arg(name)
            .args(words)
            .output()
            .map_err(|e| PhantomError::ModuleLoad {
                module: self.module.clone(),
                e,
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PhantomError::ModuleLoad {
                module: self.module.clone(),
                e: io::Error::other(String::from_utf8_lossy(&output.stderr).to_string()),
            })
        }
    }
}

/// Index of a live mapping inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(usize);

impl RegionHandle {
    /// UIO slot number the mapping was made through.
    pub fn slot(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
struct DeviceSlot {
    handle: Option<File>,
    /// Set on the first map and only cleared by closing the slot.
    mapped: bool,
    region: Option<MappedRegion>,
}

impl DeviceSlot {
    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn close(&mut self) {
        self.region = None;
        self.mapped = false;
        self.handle = None;
    }
}

pub struct DeviceRegistry {
    paths: DevicePaths,
    slots: Vec<DeviceSlot>,
    loader: Box<dyn ModuleLoader>,
    delay: Arc<dyn Delay>,
    settle: Duration,
}

impl DeviceRegistry {
    pub fn new(
        paths: DevicePaths,
        loader: Box<dyn ModuleLoader>,
        delay: Arc<dyn Delay>,
        settle: Duration,
    ) -> DeviceRegistry {
        DeviceRegistry {
            paths,
            slots: (0..NUM_UIO_DEVS).map(|_| DeviceSlot::default()).collect(),
            loader,
            delay,
            settle,
        }
    }

    /// Open every UIO node, loading the driver and retrying once if any of them is missing.
    ///
    /// # Returns: `Result<(), PhantomError>`
    /// * `Ok(())` - All [`NUM_UIO_DEVS`] slots are open
    /// * `Err(PhantomError::DeviceOpen)` - The retry failed too; no slot is left open
    pub fn open_all(&mut self) -> Result<(), PhantomError> {
        let first = match self.try_open_all() {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        warn!("Could not open UIO devices ({first}), loading the driver and retrying");
        self.close_all();
        if let Err(e) = self.loader.load_driver() {
            warn!("Driver load failed: {e}");
        }
        self.delay.delay(self.settle);
        self.try_open_all().map_err(|e| {
            self.close_all();
            PhantomError::DeviceOpen(format!("UIO devices unavailable after driver load: {e}"))
        })
    }

    fn try_open_all(&mut self) -> Result<(), PhantomError> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_open() {
                continue;
            }
            slot.handle = Some(fs_open_rw(&self.paths.device_node(i))?);
        }
        debug!("Opened {NUM_UIO_DEVS} UIO devices");
        Ok(())
    }

    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_open()).count()
    }

    /// Number of live mappings.
    pub fn mapped_count(&self) -> usize {
        self.slots.iter().filter(|s| s.region.is_some()).count()
    }

    /// Map `size` bytes of the UIO slot whose advertised base address is `base_address`.
    ///
    /// # Returns: `Result<RegionHandle, PhantomError>`
    /// * `Ok(RegionHandle)` - Handle of the new mapping; see [`region`](Self::region)
    /// * `Err(PhantomError::AddressRange)` - The window failed [`validate_window`]
    /// * `Err(PhantomError::MappingConflict)` - The matching slot was already mapped
    /// * `Err(PhantomError::DeviceNotFound)` - No open slot advertises `base_address`
    /// * `Err(PhantomError::IORead)` - A slot descriptor could not be read
    /// * `Err(PhantomError::Mmap)` - The kernel refused the mapping
    pub fn map(&mut self, base_address: u64, size: u64) -> Result<RegionHandle, PhantomError> {
        validate_window(base_address, size)?;
        let len = usize::try_from(size).map_err(|_| {
            PhantomError::AddressRange(format!("window size {size:#x} does not fit in memory"))
        })?;

        for i in 0..self.slots.len() {
            if !self.slots[i].is_open() {
                continue;
            }
            let addr_file = self.paths.map_addr_file(i);
            let advertised = fs_read_token(&addr_file)?;
            let Some(slot_base) = parse_hex(&advertised) else {
                debug!("Skipping uio{i}: unreadable address {advertised:?} in {addr_file:?}");
                continue;
            };
            if slot_base != base_address {
                continue;
            }
            debug!("Bus address {base_address:#x} matches uio{i}");
            if self.slots[i].mapped {
                return Err(PhantomError::MappingConflict(format!(
                    "uio{i} at {base_address:#x} is already mapped"
                )));
            }
            self.warn_if_oversized(i, size);

            let node = self.paths.device_node(i);
            let slot = &mut self.slots[i];
            let Some(file) = slot.handle.as_ref() else {
                continue;
            };
            let region = MappedRegion::map(file, &node, 0, len)?;
            slot.mapped = true;
            slot.region = Some(region);
            info!("Mapped {size:#x} bytes at {base_address:#x} through {node:?}");
            return Ok(RegionHandle(i));
        }

        Err(PhantomError::DeviceNotFound(format!(
            "no open UIO device advertises bus address {base_address:#x}"
        )))
    }

    fn warn_if_oversized(&self, slot: usize, size: u64) {
        let size_file = self.paths.map_size_file(slot);
        match fs_read_token(&size_file).map(|s| parse_hex(&s)) {
            Ok(Some(advertised)) if size > advertised => warn!(
                "Requested {size:#x} bytes but uio{slot} only advertises {advertised:#x}"
            ),
            Ok(_) => {}
            Err(e) => trace!("No advertised size for uio{slot}: {e}"),
        }
    }

    pub fn region(&self, handle: RegionHandle) -> Option<&MappedRegion> {
        self.slots.get(handle.0).and_then(|s| s.region.as_ref())
    }

    /// Drop every mapping held by `components` and clear their references.
    ///
    /// Safe to call repeatedly. Any mapping not referenced by a component is dropped too.
    pub fn unmap_all(&mut self, components: &mut [ComponentDescriptor]) {
        for component in components.iter_mut() {
            for mapping in [&mut component.mapping0, &mut component.mapping1] {
                if let Some(handle) = mapping.take()
                    && let Some(slot) = self.slots.get_mut(handle.0)
                    && slot.region.take().is_some()
                {
                    debug!("Unmapped uio{} for {}", handle.0, component.idstring);
                }
            }
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.region.take().is_some() {
                debug!("Unmapped unreferenced uio{i}");
            }
        }
    }

    /// Close every slot, dropping any mapping still held.
    pub fn close_all(&mut self) {
        let open = self.open_count();
        self.slots.iter_mut().for_each(DeviceSlot::close);
        if open > 0 {
            debug!("Closed {open} UIO devices");
        }
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Parse a sysfs hex value such as `0x43c00000`.
fn parse_hex(s: &str) -> Option<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).ok()
}
