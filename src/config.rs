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

//! Runtime configuration.
//!
//! Hardcoded defaults describe a MicroZed board running the PHANTOM staging layout. They can be
//! overridden by a vendor file ([`VENDOR_CONFIG_PATH`]) and then by a user file
//! ([`USER_CONFIG_PATH`]); see [`config_files`] for the file format. The resolved
//! [`PhantomConfig`] is a plain value handed to [`Platform::initialise`](crate::platform::Platform::initialise).

pub mod boot;
pub mod config_files;

use crate::hardware::device_registry::DevicePaths;
use log::{trace, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub static VENDOR_CONFIG_PATH: &str = "/usr/lib/phantom/config.toml";
pub static USER_CONFIG_PATH: &str = "/etc/phantom/config.toml";

/// Where the archive staging step unpacks the platform files. Typically the boot SD card.
pub static PHANTOM_ROOT: &str = "/run/media/mmcblk0p1/phantom/";
/// Location of the configuration document relative to [`PHANTOM_ROOT`].
pub static CONF_FILE_REL: &str = "fpga/conf/phantom_fpga_conf.xml";
/// Location of the bitstream directory relative to [`PHANTOM_ROOT`].
pub static BITFILE_DIR_REL: &str = "fpga/bitfile/";

/// UIO nodes are this prefix followed by the slot number, e.g. `/dev/uio3`.
pub static UIO_DEVICE_PREFIX: &str = "/dev/uio";
pub static UIO_SYSFS_DIR: &str = "/sys/class/uio/";

pub static FPGA_DONE_FILE: &str = "/sys/class/xdevcfg/xdevcfg/device/prog_done";
pub static FPGA_CONFIG_SINK: &str = "/dev/xdevcfg";
pub static PHYSICAL_MEMORY: &str = "/dev/mem";

pub static TARGET_BOARD: &str = "microzed";
#[cfg(not(feature = "wide-registers"))]
pub static TARGET_FPGA: &str = "zynq_apsoc";
#[cfg(feature = "wide-registers")]
pub static TARGET_FPGA: &str = "zynq_mpsoc";

/// Kernel module (plus parameters) that binds the fabric's cores to UIO.
pub static DRIVER_MODULE: &str = "uio_pdrv_genirq of_id=phantom_platform,generic-uio,ui_pdrv";
pub const DRIVER_SETTLE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhantomConfig {
    pub phantom_root: PathBuf,
    pub uio_device_prefix: String,
    pub uio_sysfs_dir: PathBuf,
    pub fpga_done_file: PathBuf,
    pub fpga_config_sink: PathBuf,
    pub physical_memory: PathBuf,
    /// Board this process runs on. Documents targeting `"generic"` are accepted too.
    pub target_board: String,
    pub target_fpga_type: String,
    pub driver_module: String,
    /// How long to wait for the kernel to create UIO nodes after loading the driver.
    pub driver_settle: Duration,
    pub configure_on_startup: bool,
    pub reset_lines_after_configure: Option<u8>,
}

impl Default for PhantomConfig {
    fn default() -> Self {
        PhantomConfig {
            phantom_root: PathBuf::from(PHANTOM_ROOT),
            uio_device_prefix: UIO_DEVICE_PREFIX.to_string(),
            uio_sysfs_dir: PathBuf::from(UIO_SYSFS_DIR),
            fpga_done_file: PathBuf::from(FPGA_DONE_FILE),
            fpga_config_sink: PathBuf::from(FPGA_CONFIG_SINK),
            physical_memory: PathBuf::from(PHYSICAL_MEMORY),
            target_board: TARGET_BOARD.to_string(),
            target_fpga_type: TARGET_FPGA.to_string(),
            driver_module: DRIVER_MODULE.to_string(),
            driver_settle: Duration::from_millis(DRIVER_SETTLE_MS),
            configure_on_startup: false,
            reset_lines_after_configure: None,
        }
    }
}

impl PhantomConfig {
    /// Resolve the configuration from the vendor and user files, user values winning.
    ///
    /// Missing files are silently skipped. A file that exists but cannot be parsed is
    /// logged and skipped, so a broken config never prevents the daemon from starting.
    pub fn load() -> PhantomConfig {
        Self::load_from(Path::new(VENDOR_CONFIG_PATH), Path::new(USER_CONFIG_PATH))
    }

    pub fn load_from(vendor_path: &Path, user_path: &Path) -> PhantomConfig {
        let read = |path: &Path| {
            if !path.is_file() {
                trace!("No config file at {path:?}");
                return config_files::TomlConfig::default();
            }
            config_files::config_from_file(path).unwrap_or_else(|e| {
                warn!("Ignoring config file {path:?}: {e}");
                config_files::TomlConfig::default()
            })
        };
        let vendor = read(vendor_path);
        let user = read(user_path);
        user.merge(vendor).into()
    }

    /// Path of the platform configuration document.
    pub fn conf_file(&self) -> PathBuf {
        self.phantom_root.join(CONF_FILE_REL)
    }

    /// Directory holding the bitstream images named by the configuration document.
    pub fn bitfile_dir(&self) -> PathBuf {
        self.phantom_root.join(BITFILE_DIR_REL)
    }

    pub fn device_paths(&self) -> DevicePaths {
        DevicePaths {
            device_prefix: self.uio_device_prefix.clone(),
            sysfs_dir: self.uio_sysfs_dir.clone(),
        }
    }
}
