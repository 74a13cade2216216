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

use crate::common::fakes::{BITFILE, Core, FakeBoard, component, document};
use crate::common::test_functions::{compare_result, expect_error};
use crate::platform::{ADDER_BASE, ADDER_SIZE, FIR_BASE, FIR_SIZE};
use googletest::prelude::*;
use phantom::config::boot;
use phantom::hardware::device_registry::NUM_UIO_DEVS;
use phantom::hardware::fpga_controller::SLCR_FPGA_RST_CTRL;
use phantom::platform::GENERIC_PLATFORM;
use phantom::platform::ip_core::{IP_CTRL, IP_CTRL_DONE, IP_CTRL_START};
use rstest::*;
use std::result::Result;

fn two_core_board() -> FakeBoard {
    let board = FakeBoard::new();
    board.advertise(0, ADDER_BASE, ADDER_SIZE);
    board.advertise(5, FIR_BASE, FIR_SIZE);
    board.write_document(&document(
        "0.1",
        GENERIC_PLATFORM,
        &[
            component("adder_0", 7, ADDER_BASE, ADDER_SIZE),
            component("fir_0", 8, FIR_BASE, FIR_SIZE),
        ],
    ));
    board.write_bitfile(b"bitstream");
    board
}

#[gtest]
fn initialise_use_terminate() {
    let board = two_core_board();
    board.set_done("1");
    let mut platform = board.initialise().expect("platform should initialise");
    assert_eq!(platform.registry().open_count(), NUM_UIO_DEVS);
    assert_eq!(platform.registry().mapped_count(), 2);

    platform.configure().expect("bitfile present and DONE set");
    assert_eq!(board.configured_image(), b"bitstream");
    platform.reset_global().expect("fabric reset");

    {
        let adder = platform.ip(7).expect("adder present");
        adder.write(0, 0x10, 40).expect("in range");
        adder.start().expect("control register mapped");
        // Pretend the core finished.
        adder
            .write(0, IP_CTRL, IP_CTRL_START | IP_CTRL_DONE)
            .expect("in range");
        assert_eq!(adder.is_done().ok(), Some(true));
    }

    platform.terminate();
    assert_eq!(platform.registry().open_count(), 0);
    assert_eq!(platform.registry().mapped_count(), 0);
    assert!(platform.components().iter().all(|c| !c.is_mapped()));
    let adder = platform.ip(7).expect("descriptors survive terminate");
    expect_error(&adder.try_read(0, 0x10), "PhantomError::AddressRange");
    assert_eq!(adder.read(0, 0x10), 0);

    // A second terminate has nothing left to release.
    platform.terminate();
    assert_eq!(platform.registry().open_count(), 0);
}

#[gtest]
fn reinitialise_after_terminate() {
    let board = two_core_board();
    let mut first = board.initialise().expect("platform should initialise");
    first
        .ip(8)
        .expect("fir present")
        .write(0, 0x4, 0x77)
        .expect("in range");
    first.terminate();
    drop(first);

    let second = board.initialise().expect("slots are free again");
    assert_eq!(second.registry().mapped_count(), 2);
    // Same device, so the register kept its value.
    assert_eq!(second.ip(8).map(|c| c.read(0, 0x4)), Some(0x77));
}

#[gtest]
fn initialise_retries_after_driver_load() {
    let board = two_core_board();
    board.remove_node(12);
    let platform = board.initialise().expect("driver restores the node");
    assert_eq!(board.driver_loads(), 1);
    assert_eq!(platform.component_count(), 2);
}

#[gtest]
#[rstest]
#[case::shared_address(
    vec![component("adder_0", 7, ADDER_BASE, ADDER_SIZE), component("adder_1", 8, ADDER_BASE, ADDER_SIZE)],
    "PhantomError::MappingConflict"
)]
#[case::outside_bus_windows(
    vec![component("adder_0", 7, ADDER_BASE, ADDER_SIZE), component("rogue_0", 8, 0x1000_0000, 0x1000)],
    "PhantomError::AddressRange"
)]
#[case::no_device(
    vec![component("adder_0", 7, ADDER_BASE, ADDER_SIZE), component("ghost_0", 8, 0x4400_0000, 0x1000)],
    "PhantomError::DeviceNotFound"
)]
fn mapping_failure_aborts_initialise(#[case] cores: Vec<Core>, #[case] signature: &str) {
    let board = FakeBoard::new();
    board.advertise(0, ADDER_BASE, ADDER_SIZE);
    board.write_document(&document("0.1", GENERIC_PLATFORM, &cores));
    expect_error(&board.initialise(), signature);

    // Nothing stayed claimed: a valid document on the same board comes up.
    board.write_document(&document(
        "0.1",
        GENERIC_PLATFORM,
        &[component("adder_0", 7, ADDER_BASE, ADDER_SIZE)],
    ));
    let platform = board.initialise().expect("platform should initialise");
    assert_eq!(platform.registry().mapped_count(), 1);
}

#[gtest]
fn configure_without_bitfile_name() {
    let board = two_core_board();
    board.write_document(
        &document(
            "0.1",
            GENERIC_PLATFORM,
            &[component("adder_0", 7, ADDER_BASE, ADDER_SIZE)],
        )
        .replace(BITFILE, ""),
    );
    let platform = board.initialise().expect("platform should initialise");
    expect_error(&platform.configure(), "PhantomError::Argument");
}

#[gtest]
#[rstest]
#[case::not_requested(false, None, "1", Ok("not configured on startup"))]
#[case::configure_only(true, None, "1", Ok("demo_top.bit loaded on startup"))]
#[case::configure_and_reset(true, Some(0x3), "1", Ok("reset lines 0x3 pulsed"))]
#[case::done_stays_low(true, Some(0x3), "0", Err("PhantomError::NotConfigured"))]
fn boot_actions(
    #[case] configure_on_startup: bool,
    #[case] reset_lines: Option<u8>,
    #[case] done: &str,
    #[case] exp: Result<&str, &str>,
) {
    let mut board = two_core_board();
    board.config.configure_on_startup = configure_on_startup;
    board.config.reset_lines_after_configure = reset_lines;
    board.set_done(done);
    let platform = board.initialise().expect("platform should initialise");

    compare_result(&boot::load_defaults(&platform), &exp);
    let resets = board
        .memory
        .writes()
        .iter()
        .filter(|w| w.1 == SLCR_FPGA_RST_CTRL)
        .count();
    let expected_resets = if exp.is_ok() && reset_lines.is_some() { 2 } else { 0 };
    assert_eq!(resets, expected_resets);
}
