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

//! Platform topology: what the fabric contains and where each core lives on the bus.
//!
//! The topology is recovered from the `phantom_fpga_conf.xml` document emitted by the design
//! tooling. Only that tooling's line-oriented layout is understood, one element per line:
//!
//! ```xml
//! <?xml version="1.0"?>
//! <?phantom conf file version "0.1"?>
//! <phantom_fpga>
//!     <fpga_type>zynq_apsoc</fpga_type>
//!     <target_board>microzed</target_board>
//!     <component_inst>
//!         <name>adder_0</name>
//!         <ipname>adder</ipname>
//!         <id>7</id>
//!         <slave_addr_base_0>0x43C00000</slave_addr_base_0>
//!         <slave_addr_range_0>0x10000</slave_addr_range_0>
//!     </component_inst>
//! </phantom_fpga>
//! ```

mod parser;
mod types;

pub use parser::{MAX_COMPONENTS, SUPPORTED_VERSION, parse_file, parse_str, parse_uint};
pub use types::{ComponentDescriptor, PlatformInfo, SlaveWindow, Topology};
