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

use zbus::{Result, proxy};
#[proxy(
    default_service = "org.phantom.phantomd",
    interface = "org.phantom.phantomd.control",
    default_path = "/org/phantom/phantomd/control"
)]
pub trait Control {
    async fn initialise(&self) -> Result<String>;
    async fn terminate(&self) -> Result<String>;
    async fn configure(&self) -> Result<String>;
    async fn configuration_reset(&self) -> Result<String>;
    async fn reset_lines(&self, mask: u8) -> Result<String>;
    async fn reset_global(&self) -> Result<String>;
    async fn start_ip(&self, id: u32) -> Result<String>;
    async fn set_autorestart(&self, id: u32, enabled: bool) -> Result<String>;

    async fn write_register(&self, id: u32, slave: u8, offset: u64, value: u64)
    -> Result<String>;
}
