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

use crate::error::PhantomError;
use crate::hardware::fpga_controller::ResetLines;
use crate::platform::Platform;
use log::{info, trace};

/// Run the `[boot]` actions of the platform's configuration.
///
/// When `configure_on_startup` is set the design's bitstream is loaded, and if that succeeds
/// the `reset_lines_after_configure` mask (if any) is pulsed.
///
/// # Returns: `Result<String, PhantomError>`
/// * `Ok(String)` - One line per action taken or skipped
/// * `Err(PhantomError)` - The first failing action
pub fn load_defaults(platform: &Platform) -> Result<String, PhantomError> {
    let config = platform.config();
    let mut ret_string = String::new();
    if !config.configure_on_startup {
        info!("configure_on_startup is not set, leaving the FPGA as it is");
        ret_string.push_str("FPGA not configured on startup\n");
        return Ok(ret_string);
    }

    trace!(
        "Configuring {} on startup",
        platform.platform_info().bitfile
    );
    platform.configure()?;
    ret_string.push_str(&format!(
        "{} loaded on startup\n",
        platform.platform_info().bitfile
    ));

    if let Some(mask) = config.reset_lines_after_configure {
        platform.reset(ResetLines::from_bits(mask))?;
        info!("Pulsed reset lines {mask:#x} after startup configure");
        ret_string.push_str(&format!("reset lines {mask:#x} pulsed\n"));
    }
    Ok(ret_string)
}
