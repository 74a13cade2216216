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

//! PHANTOM platform hardware abstraction layer.
//!
//! Discovers the IP cores of a Zynq FPGA design from its configuration document, maps their
//! AXI slave windows through UIO, and drives FPGA configuration and fabric resets.
//!
//! ```rust,no_run
//! use phantom::config::PhantomConfig;
//! use phantom::platform::Platform;
//!
//! # fn example() -> Result<(), phantom::error::PhantomError> {
//! let mut platform = Platform::initialise(&PhantomConfig::load())?;
//! platform.configure()?;
//! if let Some(core) = platform.ip(7) {
//!     core.write(0, 0x10, 42)?;
//!     core.start()?;
//!     while !core.is_done()? {}
//!     println!("result: {}", core.read(0, 0x18));
//! }
//! platform.terminate();
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`topology`] - configuration document parser and the component model
//! - [`hardware`] - UIO device registry, FPGA controller and memory-mapped register access
//! - [`platform`] - the [`Platform`](platform::Platform) owner and per-core register views
//! - [`config`] - runtime configuration files and boot actions
//! - [`system_io`] - file helpers with error conversion
//! - [`error`] - the crate error type

pub mod config;
pub mod error;
pub mod hardware;
pub mod platform;
pub mod system_io;
pub mod topology;

/// Revision of the platform API.
pub static VERSION: &str = "0.11";

pub fn version() -> &'static str {
    VERSION
}
