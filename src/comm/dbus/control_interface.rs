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

use crate::comm::dbus::{SharedPlatform, initialised, ip_core, register_offset, register_value};
use log::{info, trace};
use phantom::config::PhantomConfig;
use phantom::hardware::fpga_controller::ResetLines;
use phantom::platform::Platform;
use zbus::{fdo, interface};

pub struct ControlInterface {
    pub platform: SharedPlatform,
    pub config: PhantomConfig,
}

#[interface(name = "org.phantom.phantomd.control")]
impl ControlInterface {
    /// (Re)build the platform from the configuration document, replacing any current one.
    async fn initialise(&self) -> Result<String, fdo::Error> {
        info!("initialise called");
        let mut guard = self.platform.lock().await;
        if let Some(mut old) = guard.take() {
            trace!("Terminating the current platform before reinitialising");
            old.terminate();
        }
        let platform = Platform::initialise(&self.config)?;
        let count = platform.component_count();
        *guard = Some(platform);
        Ok(format!("Platform initialised with {count} components"))
    }

    async fn terminate(&self) -> Result<String, fdo::Error> {
        info!("terminate called");
        let mut guard = self.platform.lock().await;
        match guard.take() {
            Some(mut platform) => {
                platform.terminate();
                Ok("Platform terminated".to_string())
            }
            None => Ok("Platform was not initialised".to_string()),
        }
    }

    async fn configure(&self) -> Result<String, fdo::Error> {
        info!("configure called");
        let guard = self.platform.lock().await;
        let platform = initialised(&guard)?;
        platform.configure()?;
        Ok(format!("{} loaded", platform.platform_info().bitfile))
    }

    async fn configuration_reset(&self) -> Result<String, fdo::Error> {
        info!("configuration_reset called");
        let guard = self.platform.lock().await;
        initialised(&guard)?.configuration_reset()?;
        Ok("FPGA configuration cleared".to_string())
    }

    async fn reset_lines(&self, mask: u8) -> Result<String, fdo::Error> {
        info!("reset_lines called with mask: {mask:#x}");
        let guard = self.platform.lock().await;
        initialised(&guard)?.reset(ResetLines::from_bits(mask))?;
        Ok(format!("Reset lines {mask:#x} pulsed"))
    }

    async fn reset_global(&self) -> Result<String, fdo::Error> {
        info!("reset_global called");
        let guard = self.platform.lock().await;
        initialised(&guard)?.reset_global()?;
        Ok("All reset lines pulsed".to_string())
    }

    async fn start_ip(&self, id: u32) -> Result<String, fdo::Error> {
        info!("start_ip called with id: {id}");
        let guard = self.platform.lock().await;
        let core = ip_core(initialised(&guard)?, id)?;
        core.start()?;
        Ok(format!("{} started", core.idstring()))
    }

    async fn set_autorestart(&self, id: u32, enabled: bool) -> Result<String, fdo::Error> {
        info!("set_autorestart called with id: {id} and enabled: {enabled}");
        let guard = self.platform.lock().await;
        let core = ip_core(initialised(&guard)?, id)?;
        if enabled {
            core.set_autorestart()?;
        } else {
            core.clear_autorestart()?;
        }
        Ok(format!(
            "Autorestart {} for {}",
            if enabled { "set" } else { "cleared" },
            core.idstring()
        ))
    }

    async fn write_register(
        &self,
        id: u32,
        slave: u8,
        offset: u64,
        value: u64,
    ) -> Result<String, fdo::Error> {
        info!(
            "write_register called with id: {id}, slave: {slave}, offset: {offset:#x} and value: {value:#x}"
        );
        let guard = self.platform.lock().await;
        let core = ip_core(initialised(&guard)?, id)?;
        core.write(slave, register_offset(offset)?, register_value(value)?)?;
        Ok(format!(
            "{value:#x} written to {} s{slave}[{offset:#x}]",
            core.idstring()
        ))
    }
}
