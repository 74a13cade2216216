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

//! Configuration document parser.
//!
//! The document is read once into memory and split into lines. Every field is then looked up
//! by its own pass over the enclosing block, so fields may appear in any order and unknown
//! lines are ignored. A field line is recognised only when the first `<` on the line is
//! followed by exactly `name>`, which keeps `<id>` from matching `<ipname>`.

use crate::error::PhantomError;
use crate::hardware::BusAddress;
use crate::system_io::fs_read_lossy;
use crate::topology::types::{ComponentDescriptor, PlatformInfo, SlaveWindow, Topology};
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::path::Path;

/// Document format version this parser understands. Only the first three characters of the
/// document's version are compared.
pub const SUPPORTED_VERSION: &str = "0.1";
pub const MAX_COMPONENTS: usize = 30;

const VERSION_HEADER: &str = "phantom conf file version";
const TOPOLOGY_TAG: &str = "phantom_fpga";
const TOPOLOGY_END_TAG: &str = "/phantom_fpga";
const COMPONENT_TAG: &str = "component_inst";
const COMPONENT_END_TAG: &str = "/component_inst";

/// Parse the configuration document at `path`.
pub fn parse_file(path: &Path) -> Result<Topology, PhantomError> {
    debug!("Parsing configuration document {path:?}");
    parse_str(&fs_read_lossy(path)?)
}

/// Parse a configuration document held in memory.
///
/// # Returns: `Result<Topology, PhantomError>`
/// * `Ok(Topology)` - Platform identity and components in document order
/// * `Err(PhantomError::Version)` - Missing or unsupported version header
/// * `Err(PhantomError::Structure)` - Missing `phantom_fpga` block or unterminated component
/// * `Err(PhantomError::Capacity)` - More than [`MAX_COMPONENTS`] components
pub fn parse_str(document: &str) -> Result<Topology, PhantomError> {
    let lines: Vec<&str> = document.lines().collect();
    check_version(&lines)?;
    let block = topology_block(&lines)?;
    let platform = platform_info(block);
    let components = components(block)?;
    warn_duplicate_ids(&components);
    debug!(
        "Parsed {} components for {} ({})",
        components.len(),
        platform.platform,
        platform.fpga_type
    );
    Ok(Topology {
        platform,
        components,
    })
}

fn check_version(lines: &[&str]) -> Result<(), PhantomError> {
    let Some(version) = lines
        .iter()
        .copied()
        .find_map(|l| header_data(l, VERSION_HEADER))
    else {
        return Err(PhantomError::Version(format!(
            "no '{VERSION_HEADER}' header found"
        )));
    };
    if !version.starts_with(SUPPORTED_VERSION) {
        return Err(PhantomError::Version(format!(
            "document version {version:?} is not {SUPPORTED_VERSION:?}"
        )));
    }
    trace!("Document version {version}");
    Ok(())
}

/// Quoted data of a `<? ... header "data" ... ?>` processing instruction.
fn header_data<'a>(line: &'a str, header: &str) -> Option<&'a str> {
    let pi = &line[line.find("<?")?..];
    let after_header = &pi[pi.find(header)?..];
    let quoted = &after_header[after_header.find('"')? + 1..];
    let data = &quoted[..quoted.find('"')?];
    (!data.is_empty() && line.contains("?>")).then_some(data)
}

fn is_tag(line: &str, tag: &str) -> bool {
    let Some(start) = line.find('<') else {
        return false;
    };
    let rest = &line[start + 1..];
    if rest.starts_with(['!', '?', ' ']) {
        return false;
    }
    rest.strip_prefix(tag).is_some_and(|r| r.starts_with('>'))
}

/// Text between the first `>` and the following `<`, or empty.
fn element_text(line: &str) -> &str {
    let Some(open) = line.find('>') else {
        return "";
    };
    let text = &line[open + 1..];
    text.find('<').map_or("", |close| &text[..close])
}

fn find_field<'a>(block: &[&'a str], tag: &str) -> Option<&'a str> {
    block
        .iter()
        .copied()
        .find(|line| is_tag(line, tag))
        .map(element_text)
}

/// Lines strictly between `<phantom_fpga>` and `</phantom_fpga>`.
fn topology_block<'a, 'b>(lines: &'b [&'a str]) -> Result<&'b [&'a str], PhantomError> {
    let open = lines
        .iter()
        .position(|l| is_tag(l, TOPOLOGY_TAG))
        .ok_or_else(|| PhantomError::Structure(format!("no <{TOPOLOGY_TAG}> element")))?;
    let body = &lines[open + 1..];
    let close = body
        .iter()
        .position(|l| is_tag(l, TOPOLOGY_END_TAG))
        .ok_or_else(|| PhantomError::Structure(format!("<{TOPOLOGY_TAG}> is never closed")))?;
    Ok(&body[..close])
}

fn platform_info(block: &[&str]) -> PlatformInfo {
    let field = |tag: &str| match find_field(block, tag) {
        Some(text) => text.to_string(),
        None => {
            warn!("Configuration document has no <{tag}>, leaving it empty");
            String::new()
        }
    };
    PlatformInfo {
        fpga_type: field("fpga_type"),
        fpga_device: field("target_device"),
        platform: field("target_board"),
        design: field("design_name"),
        bitfile: field("design_bitfile"),
    }
}

fn components(block: &[&str]) -> Result<Vec<ComponentDescriptor>, PhantomError> {
    let mut components = Vec::new();
    let mut rest = block;
    while let Some(open) = rest.iter().position(|l| is_tag(l, COMPONENT_TAG)) {
        let body = &rest[open + 1..];
        let close = body
            .iter()
            .position(|l| is_tag(l, COMPONENT_END_TAG))
            .ok_or_else(|| {
                PhantomError::Structure(format!(
                    "<{COMPONENT_TAG}> number {} is never closed",
                    components.len() + 1
                ))
            })?;
        if components.len() == MAX_COMPONENTS {
            return Err(PhantomError::Capacity(format!(
                "more than {MAX_COMPONENTS} components in configuration document"
            )));
        }
        components.push(component(&body[..close]));
        rest = &body[close + 1..];
    }
    Ok(components)
}

fn component(body: &[&str]) -> ComponentDescriptor {
    let text = |tag: &str| find_field(body, tag).unwrap_or_default().to_string();
    let number = |tag: &str| find_field(body, tag).map_or(0, parse_uint);

    let descriptor = ComponentDescriptor {
        idstring: text("name"),
        ipname: text("ipname"),
        id: number("id") as u32,
        num_axi_masters: number("num_masters") as u8,
        slave0: SlaveWindow {
            base_address: number("slave_addr_base_0") as BusAddress,
            size: number("slave_addr_range_0") as u32,
        },
        slave1: SlaveWindow {
            base_address: number("slave_addr_base_1") as BusAddress,
            size: number("slave_addr_range_1") as u32,
        },
        ..Default::default()
    };
    trace!("Parsed component {descriptor:?}");
    descriptor
}

fn warn_duplicate_ids(components: &[ComponentDescriptor]) {
    let mut seen = HashSet::new();
    for c in components {
        if !seen.insert(c.id) {
            warn!(
                "Component id {} is used more than once ({}); lookups by id return the first",
                c.id, c.idstring
            );
        }
    }
}

/// Parse an integer literal the way C's `strtoul(text, NULL, 0)` does.
///
/// Leading whitespace and a sign are accepted. `0x` selects hex, a leading `0` octal, anything
/// else decimal. Parsing stops at the first invalid digit, so an empty or non-numeric text is
/// 0. Overflow saturates at `u64::MAX`; callers truncate to the field width.
pub fn parse_uint(text: &str) -> u64 {
    let s = text.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .filter(|digits| digits.starts_with(|c: char| c.is_ascii_hexdigit()));
    let (radix, digits) = match hex {
        Some(digits) => (16, digits),
        None if s.starts_with('0') => (8, s),
        None => (10, s),
    };

    let mut value: u64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        match value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => value = v,
            None => return u64::MAX,
        }
    }
    if negative { value.wrapping_neg() } else { value }
}
