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

use crate::hardware::BusAddress;
use crate::hardware::device_registry::RegionHandle;

/// Identity of the fabric design, from the document's top-level fields.
///
/// Fields absent from the document are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Board the design targets (`target_board`), or `"generic"`.
    pub platform: String,
    pub fpga_type: String,
    /// Part number (`target_device`).
    pub fpga_device: String,
    pub design: String,
    /// Bitstream file name, relative to the bitfile directory.
    pub bitfile: String,
}

/// One AXI slave interface of a core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlaveWindow {
    /// Zero when the core does not use this interface.
    pub base_address: BusAddress,
    pub size: u32,
}

impl SlaveWindow {
    pub fn is_used(&self) -> bool {
        self.base_address != 0
    }
}

/// A core instance in the fabric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub ipname: String,
    /// Instance name (`name`), unique in practice.
    pub idstring: String,
    pub id: u32,
    pub num_axi_masters: u8,
    pub slave0: SlaveWindow,
    pub slave1: SlaveWindow,
    pub(crate) mapping0: Option<RegionHandle>,
    pub(crate) mapping1: Option<RegionHandle>,
}

impl ComponentDescriptor {
    /// Slave window `index`, for index 0 or 1.
    pub fn slave(&self, index: u8) -> Option<&SlaveWindow> {
        match index {
            0 => Some(&self.slave0),
            1 => Some(&self.slave1),
            _ => None,
        }
    }

    /// Live mapping of slave window `index`, if any.
    pub fn mapping(&self, index: u8) -> Option<RegionHandle> {
        match index {
            0 => self.mapping0,
            1 => self.mapping1,
            _ => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping0.is_some() || self.mapping1.is_some()
    }
}

/// Everything one configuration document describes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub platform: PlatformInfo,
    /// Components in document order.
    pub components: Vec<ComponentDescriptor>,
}
