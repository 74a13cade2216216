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

//! Read-only commands: `status`, `info`, `list` and `read`.

use crate::proxies::status_proxy;
use zbus::Connection;

async fn status_proxy() -> Result<status_proxy::StatusProxy<'static>, zbus::Error> {
    let connection = Connection::system().await?;
    status_proxy::StatusProxy::new(&connection).await
}

/// Sends the dbus command to get the component list, one entry per line
pub async fn call_get_components() -> Result<Vec<String>, zbus::Error> {
    let list_str = status_proxy().await?.get_components().await?;
    Ok(list_str.lines().map(|line| line.to_string()).collect())
}

/// Extracts the component id from a `get_components` line
fn component_id(line: &str) -> Option<u32> {
    line.split(':').next()?.parse().ok()
}

/// Version, DONE and the control status of every component as an ascii table
pub async fn status_handler() -> Result<String, zbus::Error> {
    let proxy = status_proxy().await?;
    let version = proxy.get_version().await?;
    let done = proxy.get_fpga_done().await?;
    let mut ret_string = format!(
        "---- PLATFORM ----\n| api version | fpga done |\n| {version} | {done} |\n\n---- COMPONENTS ----\n| id | status |\n"
    );
    for line in call_get_components().await? {
        let Some(id) = component_id(&line) else {
            continue;
        };
        let status = proxy.get_ip_status(id).await?;
        ret_string += format!("| {id} | {status} |\n").as_str();
    }
    Ok(ret_string)
}

pub async fn info_handler() -> Result<String, zbus::Error> {
    status_proxy().await?.get_platform_info().await
}

pub async fn list_handler() -> Result<String, zbus::Error> {
    let mut ret_string = String::from("| id:name:ipname | slave windows |\n");
    for line in call_get_components().await? {
        ret_string += format!("{line}\n").as_str();
    }
    Ok(ret_string)
}

pub async fn read_handler(id: u32, slave: u8, offset: u64) -> Result<String, zbus::Error> {
    let value = status_proxy()
        .await?
        .read_register(id, slave, offset)
        .await?;
    Ok(format!("{value:#x}"))
}
