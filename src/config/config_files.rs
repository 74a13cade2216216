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

//! TOML config file format.
//!
//! ```toml
//! [paths]
//! phantom_root = "/run/media/mmcblk0p1/phantom/"
//! uio_device_prefix = "/dev/uio"
//!
//! [target]
//! board = "zc706"
//! fpga_type = "zynq_apsoc"
//!
//! [driver]
//! settle_ms = 500
//!
//! [boot]
//! configure_on_startup = true
//! reset_lines_after_configure = 0xf
//! ```
//!
//! Every key is optional.

use crate::config::{self, PhantomConfig};
use crate::error::PhantomError;
use crate::system_io::fs_read;
use log::trace;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// This is the top level struct which holds all sections
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    paths: Option<PathsSection>,
    target: Option<TargetSection>,
    driver: Option<DriverSection>,
    boot: Option<BootSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PathsSection {
    phantom_root: Option<String>,
    uio_device_prefix: Option<String>,
    uio_sysfs_dir: Option<String>,
    fpga_done_file: Option<String>,
    fpga_config_sink: Option<String>,
    physical_memory: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetSection {
    board: Option<String>,
    fpga_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverSection {
    module: Option<String>,
    settle_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BootSection {
    configure_on_startup: Option<bool>,
    reset_lines_after_configure: Option<u8>,
}

impl PathsSection {
    fn merge(self, fallback: PathsSection) -> PathsSection {
        PathsSection {
            phantom_root: self.phantom_root.or(fallback.phantom_root),
            uio_device_prefix: self.uio_device_prefix.or(fallback.uio_device_prefix),
            uio_sysfs_dir: self.uio_sysfs_dir.or(fallback.uio_sysfs_dir),
            fpga_done_file: self.fpga_done_file.or(fallback.fpga_done_file),
            fpga_config_sink: self.fpga_config_sink.or(fallback.fpga_config_sink),
            physical_memory: self.physical_memory.or(fallback.physical_memory),
        }
    }
}

impl TargetSection {
    fn merge(self, fallback: TargetSection) -> TargetSection {
        TargetSection {
            board: self.board.or(fallback.board),
            fpga_type: self.fpga_type.or(fallback.fpga_type),
        }
    }
}

impl DriverSection {
    fn merge(self, fallback: DriverSection) -> DriverSection {
        DriverSection {
            module: self.module.or(fallback.module),
            settle_ms: self.settle_ms.or(fallback.settle_ms),
        }
    }
}

impl BootSection {
    fn merge(self, fallback: BootSection) -> BootSection {
        BootSection {
            configure_on_startup: self.configure_on_startup.or(fallback.configure_on_startup),
            reset_lines_after_configure: self
                .reset_lines_after_configure
                .or(fallback.reset_lines_after_configure),
        }
    }
}

impl TomlConfig {
    /// Fill every key missing from `self` with the one from `fallback`.
    pub fn merge(self, fallback: TomlConfig) -> TomlConfig {
        TomlConfig {
            paths: Some(
                self.paths
                    .unwrap_or_default()
                    .merge(fallback.paths.unwrap_or_default()),
            ),
            target: Some(
                self.target
                    .unwrap_or_default()
                    .merge(fallback.target.unwrap_or_default()),
            ),
            driver: Some(
                self.driver
                    .unwrap_or_default()
                    .merge(fallback.driver.unwrap_or_default()),
            ),
            boot: Some(
                self.boot
                    .unwrap_or_default()
                    .merge(fallback.boot.unwrap_or_default()),
            ),
        }
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        trace!("No {key} provided. Using hardcoded value.");
        default.to_string()
    })
}

impl From<TomlConfig> for PhantomConfig {
    fn from(value: TomlConfig) -> Self {
        trace!("Creating PhantomConfig from {value:?}");
        let paths = value.paths.unwrap_or_default();
        let target = value.target.unwrap_or_default();
        let driver = value.driver.unwrap_or_default();
        let boot = value.boot.unwrap_or_default();
        PhantomConfig {
            phantom_root: PathBuf::from(or_default(
                paths.phantom_root,
                "phantom_root",
                config::PHANTOM_ROOT,
            )),
            uio_device_prefix: or_default(
                paths.uio_device_prefix,
                "uio_device_prefix",
                config::UIO_DEVICE_PREFIX,
            ),
            uio_sysfs_dir: PathBuf::from(or_default(
                paths.uio_sysfs_dir,
                "uio_sysfs_dir",
                config::UIO_SYSFS_DIR,
            )),
            fpga_done_file: PathBuf::from(or_default(
                paths.fpga_done_file,
                "fpga_done_file",
                config::FPGA_DONE_FILE,
            )),
            fpga_config_sink: PathBuf::from(or_default(
                paths.fpga_config_sink,
                "fpga_config_sink",
                config::FPGA_CONFIG_SINK,
            )),
            physical_memory: PathBuf::from(or_default(
                paths.physical_memory,
                "physical_memory",
                config::PHYSICAL_MEMORY,
            )),
            target_board: or_default(target.board, "board", config::TARGET_BOARD),
            target_fpga_type: or_default(target.fpga_type, "fpga_type", config::TARGET_FPGA),
            driver_module: or_default(driver.module, "module", config::DRIVER_MODULE),
            driver_settle: Duration::from_millis(
                driver.settle_ms.unwrap_or(config::DRIVER_SETTLE_MS),
            ),
            configure_on_startup: boot.configure_on_startup.unwrap_or(false),
            reset_lines_after_configure: boot.reset_lines_after_configure,
        }
    }
}

pub fn toml_str_to_config(toml_string: &str) -> Result<TomlConfig, PhantomError> {
    toml::from_str(toml_string).map_err(|e| PhantomError::TomlDe {
        toml_string: toml_string.into(),
        e,
    })
}

pub fn config_from_file(file_path: &Path) -> Result<TomlConfig, PhantomError> {
    if !file_path.is_file() {
        return Err(PhantomError::Internal(format!(
            "Config file not found in {file_path:?}"
        )));
    }
    toml_str_to_config(&fs_read(file_path)?)
}
