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

//! Register access to a single IP core.
//!
//! Offsets are byte offsets from the start of a slave window and must be below the window's
//! declared size. The control helpers follow the HLS block-level protocol: a control word at
//! offset 0 of slave 0.

use crate::error::PhantomError;
use crate::hardware::RegValue;
use crate::hardware::device_registry::DeviceRegistry;
use crate::hardware::mapped_region::MappedRegion;
use crate::topology::ComponentDescriptor;
use log::{trace, warn};

/// Control word offset on slave 0.
pub const IP_CTRL: usize = 0x00;
pub const IP_CTRL_START: RegValue = 1 << 0;
pub const IP_CTRL_DONE: RegValue = 1 << 1;
pub const IP_CTRL_IDLE: RegValue = 1 << 2;
pub const IP_CTRL_READY: RegValue = 1 << 3;
pub const IP_CTRL_AUTORESTART: RegValue = 1 << 7;

/// A component together with the registry holding its mappings.
///
/// Borrowing the platform keeps the mappings alive for as long as the view exists.
#[derive(Clone, Copy)]
pub struct IpCore<'a> {
    descriptor: &'a ComponentDescriptor,
    registry: &'a DeviceRegistry,
}

impl<'a> IpCore<'a> {
    pub(crate) fn new(descriptor: &'a ComponentDescriptor, registry: &'a DeviceRegistry) -> Self {
        IpCore {
            descriptor,
            registry,
        }
    }

    pub fn descriptor(&self) -> &'a ComponentDescriptor {
        self.descriptor
    }

    pub fn id(&self) -> u32 {
        self.descriptor.id
    }

    pub fn idstring(&self) -> &'a str {
        &self.descriptor.idstring
    }

    pub fn ipname(&self) -> &'a str {
        &self.descriptor.ipname
    }

    fn window(&self, slave: u8, offset: usize) -> Result<&'a MappedRegion, PhantomError> {
        let d = self.descriptor;
        let window = d.slave(slave).ok_or_else(|| {
            PhantomError::AddressRange(format!("{} has no slave interface {slave}", d.idstring))
        })?;
        if offset as u64 >= u64::from(window.size) {
            return Err(PhantomError::AddressRange(format!(
                "offset {offset:#x} is outside slave {slave} of {} ({:#x} bytes)",
                d.idstring, window.size
            )));
        }
        d.mapping(slave)
            .and_then(|handle| self.registry.region(handle))
            .ok_or_else(|| {
                PhantomError::AddressRange(format!(
                    "slave {slave} of {} is not mapped",
                    d.idstring
                ))
            })
    }

    /// Read a register, failing on a bad slave index, offset or missing mapping.
    pub fn try_read(&self, slave: u8, offset: usize) -> Result<RegValue, PhantomError> {
        let value = self.window(slave, offset)?.read::<RegValue>(offset)?;
        trace!(
            "{} s{slave}[{offset:#x}] -> {value:#x}",
            self.descriptor.idstring
        );
        Ok(value)
    }

    /// Read a register. Any access that [`try_read`](Self::try_read) would reject reads as 0.
    ///
    /// A 0 from here cannot be told apart from a register that holds 0; use `try_read` when the
    /// difference matters.
    pub fn read(&self, slave: u8, offset: usize) -> RegValue {
        self.try_read(slave, offset).unwrap_or_else(|e| {
            warn!("Register read returned 0 instead: {e}");
            0
        })
    }

    /// Write a register.
    ///
    /// # Returns: `Result<(), PhantomError>`
    /// * `Ok(())` - The value was written
    /// * `Err(PhantomError::AddressRange)` - Bad slave index or offset, or the slave is unmapped
    pub fn write(&self, slave: u8, offset: usize, value: RegValue) -> Result<(), PhantomError> {
        trace!(
            "{} s{slave}[{offset:#x}] <- {value:#x}",
            self.descriptor.idstring
        );
        self.window(slave, offset)?.write::<RegValue>(offset, value)
    }

    fn control(&self) -> Result<RegValue, PhantomError> {
        self.try_read(0, IP_CTRL)
    }

    fn update_control(&self, f: impl FnOnce(RegValue) -> RegValue) -> Result<(), PhantomError> {
        let ctrl = self.control()?;
        self.write(0, IP_CTRL, f(ctrl))
    }

    /// Set `ap_start`. Has no effect on a core that is already running.
    pub fn start(&self) -> Result<(), PhantomError> {
        self.update_control(|ctrl| ctrl | IP_CTRL_START)
    }

    /// Make the core restart by itself each time it asserts `ap_done`.
    pub fn set_autorestart(&self) -> Result<(), PhantomError> {
        self.update_control(|ctrl| ctrl | IP_CTRL_AUTORESTART)
    }

    pub fn clear_autorestart(&self) -> Result<(), PhantomError> {
        self.update_control(|ctrl| ctrl & !IP_CTRL_AUTORESTART)
    }

    pub fn is_done(&self) -> Result<bool, PhantomError> {
        Ok(self.control()? & IP_CTRL_DONE != 0)
    }

    pub fn is_idle(&self) -> Result<bool, PhantomError> {
        Ok(self.control()? & IP_CTRL_IDLE != 0)
    }

    pub fn is_ready(&self) -> Result<bool, PhantomError> {
        Ok(self.control()? & IP_CTRL_READY != 0)
    }
}

impl std::fmt::Debug for IpCore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IpCore").field(self.descriptor).finish()
    }
}
