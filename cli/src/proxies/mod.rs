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

//! DBus proxy interfaces for the phantomd daemon.
//!
//! Generated with the `zbus` `#[proxy]` macro; each trait mirrors one of the daemon's
//! interfaces method for method.
//!
//! - [`control_proxy`] - Lifecycle, FPGA configuration, resets and register writes
//! - [`status_proxy`] - Platform queries and register reads
//!
//! # DBus Service Information
//!
//! - **Service Name**: `org.phantom.phantomd`
//! - **Control Interface**: `org.phantom.phantomd.control` at `/org/phantom/phantomd/control`
//! - **Status Interface**: `org.phantom.phantomd.status` at `/org/phantom/phantomd/status`

pub mod control_proxy;
pub mod status_proxy;
