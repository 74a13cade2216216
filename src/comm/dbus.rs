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

pub mod control_interface;
pub mod status_interface;

use phantom::error::PhantomError;
use phantom::hardware::RegValue;
use phantom::platform::{IpCore, Platform};
use phantom::topology::{ComponentDescriptor, PlatformInfo};
use std::sync::Arc;
use tokio::sync::Mutex;

pub static BUS_NAME: &str = "org.phantom.phantomd";
pub static STATUS_PATH: &str = "/org/phantom/phantomd/status";
pub static CONTROL_PATH: &str = "/org/phantom/phantomd/control";

/// The daemon's platform, absent until initialised. The lock serialises all hardware access.
pub type SharedPlatform = Arc<Mutex<Option<Platform>>>;

pub(crate) fn initialised(platform: &Option<Platform>) -> Result<&Platform, PhantomError> {
    platform.as_ref().ok_or_else(|| {
        PhantomError::NotInitialised("the platform has not been initialised".to_string())
    })
}

pub(crate) fn ip_core(platform: &Platform, id: u32) -> Result<IpCore<'_>, PhantomError> {
    platform
        .ip(id)
        .ok_or_else(|| PhantomError::Argument(format!("no component with id {id}")))
}

pub(crate) fn register_offset(offset: u64) -> Result<usize, PhantomError> {
    usize::try_from(offset)
        .map_err(|_| PhantomError::Argument(format!("register offset {offset:#x} is too large")))
}

pub(crate) fn register_value(value: u64) -> Result<RegValue, PhantomError> {
    RegValue::try_from(value).map_err(|_| {
        PhantomError::Argument(format!(
            "value {value:#x} does not fit in a {}-bit register",
            RegValue::BITS
        ))
    })
}

pub(crate) fn describe_platform(info: &PlatformInfo) -> String {
    format!(
        "platform: {}\nfpga_type: {}\nfpga_device: {}\ndesign: {}\nbitfile: {}\n",
        info.platform, info.fpga_type, info.fpga_device, info.design, info.bitfile
    )
}

pub(crate) fn describe_component(c: &ComponentDescriptor) -> String {
    let mut line = format!("{}:{}:{}", c.id, c.idstring, c.ipname);
    for (index, window) in [(0, &c.slave0), (1, &c.slave1)] {
        if window.is_used() {
            line += &format!(
                " s{index}={:#x}+{:#x}",
                window.base_address, window.size
            );
        }
    }
    line
}
