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

use crate::comm::dbus::{
    SharedPlatform, describe_component, describe_platform, initialised, ip_core, register_offset,
};
use log::info;
use zbus::{fdo, interface};

pub struct StatusInterface {
    pub platform: SharedPlatform,
}

#[interface(name = "org.phantom.phantomd.status")]
impl StatusInterface {
    async fn get_version(&self) -> String {
        info!("get_version called");
        phantom::version().to_string()
    }

    async fn get_platform_info(&self) -> Result<String, fdo::Error> {
        info!("get_platform_info called");
        let guard = self.platform.lock().await;
        Ok(describe_platform(initialised(&guard)?.platform_info()))
    }

    /// One `id:name:ipname [s0=base+size] [s1=base+size]` line per component.
    async fn get_components(&self) -> Result<String, fdo::Error> {
        info!("get_components called");
        let guard = self.platform.lock().await;
        let platform = initialised(&guard)?;
        Ok(platform
            .components()
            .iter()
            .map(|c| describe_component(c) + "\n")
            .collect())
    }

    async fn get_fpga_done(&self) -> Result<bool, fdo::Error> {
        info!("get_fpga_done called");
        let guard = self.platform.lock().await;
        Ok(initialised(&guard)?.is_done()?)
    }

    async fn get_ip_status(&self, id: u32) -> Result<String, fdo::Error> {
        info!("get_ip_status called with id: {id}");
        let guard = self.platform.lock().await;
        let core = ip_core(initialised(&guard)?, id)?;
        Ok(format!(
            "{}: done={} idle={} ready={}",
            core.idstring(),
            core.is_done()?,
            core.is_idle()?,
            core.is_ready()?
        ))
    }

    async fn read_register(&self, id: u32, slave: u8, offset: u64) -> Result<u64, fdo::Error> {
        info!("read_register called with id: {id}, slave: {slave}, offset: {offset:#x}");
        let guard = self.platform.lock().await;
        let core = ip_core(initialised(&guard)?, id)?;
        Ok(core.try_read(slave, register_offset(offset)?)?.into())
    }
}
