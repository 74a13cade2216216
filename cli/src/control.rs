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

//! Commands that change platform or core state.
//!
//! Each handler makes one call on the daemon's control interface and returns the daemon's
//! confirmation message.

use crate::proxies::control_proxy;
use zbus::Connection;

async fn control_proxy() -> Result<control_proxy::ControlProxy<'static>, zbus::Error> {
    let connection = Connection::system().await?;
    control_proxy::ControlProxy::new(&connection).await
}

pub async fn init_handler() -> Result<String, zbus::Error> {
    control_proxy().await?.initialise().await
}

pub async fn terminate_handler() -> Result<String, zbus::Error> {
    control_proxy().await?.terminate().await
}

pub async fn configure_handler() -> Result<String, zbus::Error> {
    control_proxy().await?.configure().await
}

pub async fn config_reset_handler() -> Result<String, zbus::Error> {
    control_proxy().await?.configuration_reset().await
}

/// Pulses the given reset lines, or all four when none are given
pub async fn reset_handler(lines: &[u8]) -> Result<String, zbus::Error> {
    let proxy = control_proxy().await?;
    if lines.is_empty() {
        return proxy.reset_global().await;
    }
    proxy.reset_lines(line_mask(lines)).await
}

fn line_mask(lines: &[u8]) -> u8 {
    lines.iter().fold(0, |mask, line| mask | 1 << line)
}

pub async fn start_handler(id: u32) -> Result<String, zbus::Error> {
    control_proxy().await?.start_ip(id).await
}

pub async fn autorestart_handler(id: u32, enabled: bool) -> Result<String, zbus::Error> {
    control_proxy().await?.set_autorestart(id, enabled).await
}

pub async fn write_handler(
    id: u32,
    slave: u8,
    offset: u64,
    value: u64,
) -> Result<String, zbus::Error> {
    control_proxy()
        .await?
        .write_register(id, slave, offset, value)
        .await
}
