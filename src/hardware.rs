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

//! Hardware access layer.
//!
//! Everything that touches device nodes, physical memory or wall-clock time lives here, behind
//! small traits so the orchestration above it can be exercised without a board:
//!
//! - [`mapped_region`] - owned, bounds-checked volatile views of mmapped device memory
//! - [`physical_memory`] - short-lived `/dev/mem` windows onto fixed SoC control blocks
//! - [`device_registry`] - the pool of UIO device slots that IP cores are mapped through
//! - [`fpga_controller`] - configuration image load, configuration reset and PL reset lines
//! - [`poll`] - bounded register polling with an injectable delay

pub mod device_registry;
pub mod fpga_controller;
pub mod mapped_region;
pub mod physical_memory;
pub mod poll;

/// Register data width of the fabric's AXI slave interfaces.
#[cfg(not(feature = "wide-registers"))]
pub type RegValue = u32;
#[cfg(feature = "wide-registers")]
pub type RegValue = u64;

/// Bus address of an AXI slave window as seen by the processing system.
#[cfg(not(feature = "wide-registers"))]
pub type BusAddress = u32;
#[cfg(feature = "wide-registers")]
pub type BusAddress = u64;
