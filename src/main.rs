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

//! PHANTOM platform daemon (phantomd).
//!
//! Owns the single [`Platform`] of the board and serves it over the system DBus, so that
//! applications and `phantom_cli` never map device memory themselves. All requests are
//! serialised through one lock, which is what the FPGA configuration sequences require.
//!
//! # DBus Service
//!
//! - **Service Name**: `org.phantom.phantomd`
//! - **Status Interface**: `/org/phantom/phantomd/status` - Queries and register reads
//! - **Control Interface**: `/org/phantom/phantomd/control` - Lifecycle, configuration, resets
//!   and register writes
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `info`
//!
//! # Startup
//!
//! 1. Load `/usr/lib/phantom/config.toml` and `/etc/phantom/config.toml`
//! 2. Initialise the platform; failure is logged and the service starts regardless, so a
//!    client can call `initialise` once the platform files are staged
//! 3. Run the `[boot]` actions
//! 4. Connect to the system DBus and wait for requests

mod comm;

use crate::comm::dbus::{
    BUS_NAME, CONTROL_PATH, STATUS_PATH, SharedPlatform, control_interface::ControlInterface,
    status_interface::StatusInterface,
};
use log::{error, info};
use phantom::config::{PhantomConfig, boot};
use phantom::platform::Platform;
use std::error::Error;
use std::future::pending;
use std::sync::Arc;
use tokio::sync::Mutex;
use zbus::connection;

fn startup_platform(config: &PhantomConfig) -> Option<Platform> {
    let platform = match Platform::initialise(config) {
        Ok(platform) => platform,
        Err(e) => {
            error!("Platform not initialised at startup: {e}");
            return None;
        }
    };
    match boot::load_defaults(&platform) {
        Ok(summary) => summary.lines().for_each(|l| info!("{l}")),
        Err(e) => error!("Boot actions failed: {e}"),
    }
    Some(platform)
}

/// Main entry point for phantomd.
///
/// # Returns: `Result<(), Box<dyn Error>>`
/// * `Ok(())` - Never returns under normal operation (runs until terminated)
/// * `Err(Box<dyn Error>)` - DBus connection or name request failed
///
/// # Examples
///
/// ```bash
/// # Run with debug logging
/// RUST_LOG=debug phantomd
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PhantomConfig::load();
    info!("phantom {} starting with {config:?}", phantom::version());
    let platform: SharedPlatform = Arc::new(Mutex::new(startup_platform(&config)));

    let status_interface = StatusInterface {
        platform: platform.clone(),
    };
    let control_interface = ControlInterface {
        platform,
        config,
    };

    let _conn = connection::Builder::system()?
        .name(BUS_NAME)?
        .serve_at(STATUS_PATH, status_interface)?
        .serve_at(CONTROL_PATH, control_interface)?
        .build()
        .await?;

    info!("Started {BUS_NAME} dbus service");
    pending::<()>().await;

    Ok(())
}
