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

//! The platform owner.
//!
//! A [`Platform`] is created by [`Platform::initialise`], which parses the configuration
//! document, checks that the design was built for this board and FPGA, opens the UIO devices
//! and maps every core's slave windows. It then hands out [`IpCore`] views for register access
//! and drives the FPGA controller until [`Platform::terminate`].
//!
//! A `Platform` is single-owner. Sharing one between threads needs an outer lock.

pub mod ip_core;

pub use ip_core::IpCore;

use crate::config::PhantomConfig;
use crate::error::PhantomError;
use crate::hardware::device_registry::{DeviceRegistry, ModprobeLoader, ModuleLoader};
use crate::hardware::fpga_controller::{FpgaController, ResetLines};
use crate::hardware::physical_memory::{DevMem, PhysicalMemory};
use crate::hardware::poll::{Delay, ThreadDelay};
use crate::topology::{ComponentDescriptor, PlatformInfo, parse_file};
use log::{debug, info};
use std::sync::Arc;

/// Board name a design may declare to run on any board with the right FPGA.
pub static GENERIC_PLATFORM: &str = "generic";

/// The pieces of the operating system a [`Platform`] reaches out to.
pub struct PlatformEnv {
    pub loader: Box<dyn ModuleLoader>,
    pub memory: Box<dyn PhysicalMemory>,
    pub delay: Arc<dyn Delay>,
}

impl PlatformEnv {
    /// `modprobe`, `/dev/mem` (or the configured replacement) and real sleeps.
    pub fn system(config: &PhantomConfig) -> PlatformEnv {
        PlatformEnv {
            loader: Box::new(ModprobeLoader::new(&config.driver_module)),
            memory: Box::new(DevMem::new(&config.physical_memory)),
            delay: Arc::new(ThreadDelay),
        }
    }
}

pub struct Platform {
    config: PhantomConfig,
    info: PlatformInfo,
    components: Vec<ComponentDescriptor>,
    registry: DeviceRegistry,
    controller: FpgaController,
}

impl Platform {
    pub fn initialise(config: &PhantomConfig) -> Result<Platform, PhantomError> {
        Self::initialise_with(config, PlatformEnv::system(config))
    }

    /// Bring up the platform described by `config`'s configuration document.
    ///
    /// # Returns: `Result<Platform, PhantomError>`
    /// * `Ok(Platform)` - Every used slave window of every component is mapped
    /// * `Err(PhantomError::Version | Structure | Capacity)` - Unusable configuration document
    /// * `Err(PhantomError::PlatformMismatch)` - The design targets another board or FPGA
    /// * `Err(PhantomError::DeviceOpen)` - UIO devices unavailable, even after loading the driver
    /// * `Err(PhantomError::AddressRange | MappingConflict | DeviceNotFound)` - A window could
    ///   not be mapped; nothing is left mapped or open
    pub fn initialise_with(
        config: &PhantomConfig,
        env: PlatformEnv,
    ) -> Result<Platform, PhantomError> {
        info!("Initialising platform from {:?}", config.conf_file());
        let topology = parse_file(&config.conf_file())?;
        check_target(config, &topology.platform)?;

        let mut registry = DeviceRegistry::new(
            config.device_paths(),
            env.loader,
            env.delay.clone(),
            config.driver_settle,
        );
        registry.open_all()?;

        let mut components = topology.components;
        if let Err(e) = map_components(&mut registry, &mut components) {
            registry.unmap_all(&mut components);
            registry.close_all();
            return Err(e);
        }

        let controller = FpgaController::new(
            &config.fpga_config_sink,
            &config.fpga_done_file,
            env.memory,
            env.delay,
        );
        info!(
            "Platform {} ({}) ready with {} components",
            topology.platform.design,
            topology.platform.platform,
            components.len()
        );
        Ok(Platform {
            config: config.clone(),
            info: topology.platform,
            components,
            registry,
            controller,
        })
    }

    pub fn config(&self) -> &PhantomConfig {
        &self.config
    }

    pub fn platform_info(&self) -> &PlatformInfo {
        &self.info
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// All components in document order.
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// Component at position `idx` in document order.
    pub fn component(&self, idx: usize) -> Option<IpCore<'_>> {
        self.components.get(idx).map(|c| self.core(c))
    }

    /// First component whose id is `id`.
    pub fn ip(&self, id: u32) -> Option<IpCore<'_>> {
        self.find(|c| c.id == id)
    }

    pub fn ip_by_idstring(&self, idstring: &str) -> Option<IpCore<'_>> {
        self.find(|c| c.idstring == idstring)
    }

    /// First component instantiating IP `ipname`.
    pub fn ip_by_name(&self, ipname: &str) -> Option<IpCore<'_>> {
        self.find(|c| c.ipname == ipname)
    }

    fn find(&self, predicate: impl Fn(&ComponentDescriptor) -> bool) -> Option<IpCore<'_>> {
        self.components
            .iter()
            .find(|&c| predicate(c))
            .map(|c| self.core(c))
    }

    fn core<'a>(&'a self, descriptor: &'a ComponentDescriptor) -> IpCore<'a> {
        IpCore::new(descriptor, &self.registry)
    }

    /// Load the design's bitstream from the bitfile directory.
    pub fn configure(&self) -> Result<(), PhantomError> {
        if self.info.bitfile.is_empty() {
            return Err(PhantomError::Argument(
                "configuration document names no design_bitfile".to_string(),
            ));
        }
        self.controller
            .configure(&self.config.bitfile_dir().join(&self.info.bitfile))
    }

    pub fn configuration_reset(&self) -> Result<(), PhantomError> {
        self.controller.configuration_reset()
    }

    pub fn reset(&self, lines: ResetLines) -> Result<(), PhantomError> {
        self.controller.reset(lines)
    }

    pub fn reset_global(&self) -> Result<(), PhantomError> {
        self.controller.reset_global()
    }

    pub fn is_done(&self) -> Result<bool, PhantomError> {
        self.controller.is_done()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Unmap every component and close all devices. Calling it again does nothing.
    pub fn terminate(&mut self) {
        if self.registry.open_count() == 0 {
            debug!("Platform already terminated");
            return;
        }
        self.registry.unmap_all(&mut self.components);
        self.registry.close_all();
        info!("Platform terminated");
    }
}

fn check_target(config: &PhantomConfig, info: &PlatformInfo) -> Result<(), PhantomError> {
    if info.platform != GENERIC_PLATFORM && info.platform != config.target_board {
        return Err(PhantomError::PlatformMismatch(format!(
            "design targets board {:?}, this is {:?}",
            info.platform, config.target_board
        )));
    }
    if info.fpga_type != config.target_fpga_type {
        return Err(PhantomError::PlatformMismatch(format!(
            "design targets FPGA {:?}, this is {:?}",
            info.fpga_type, config.target_fpga_type
        )));
    }
    Ok(())
}

fn map_components(
    registry: &mut DeviceRegistry,
    components: &mut [ComponentDescriptor],
) -> Result<(), PhantomError> {
    for c in components.iter_mut() {
        if c.slave0.is_used() {
            c.mapping0 = Some(registry.map(c.slave0.base_address.into(), c.slave0.size.into())?);
        }
        if c.slave1.is_used() {
            c.mapping1 = Some(registry.map(c.slave1.base_address.into(), c.slave1.size.into())?);
        }
        debug!("Mapped component {} (id {})", c.idstring, c.id);
    }
    Ok(())
}
