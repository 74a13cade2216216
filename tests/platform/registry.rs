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

use crate::common::fakes::{FakeBoard, NODE_LEN};
use crate::common::test_functions::expect_error;
use crate::platform::{ADDER_BASE, ADDER_SIZE, FIR_BASE, FIR_SIZE};
use googletest::prelude::*;
use phantom::hardware::device_registry::{
    GP0_MAX, GP0_MIN, GP1_MAX, GP1_MIN, MAX_WINDOW_SIZE, NUM_UIO_DEVS, validate_window,
};
use rstest::*;
use std::fs;

#[gtest]
#[rstest]
#[case::below_gp0(GP0_MIN - 1, 0x1000, false)]
#[case::gp0_start(GP0_MIN, 0x1000, true)]
#[case::gp0_end(GP0_MAX, 0x1000, true)]
#[case::past_gp0(GP0_MAX + 1, 0x1000, false)]
#[case::between_windows(0x6000_0000, 0x1000, false)]
#[case::gp1_start(GP1_MIN, 0x1000, true)]
#[case::gp1_last(GP1_MAX - 1, 0x1000, true)]
#[case::gp1_end(GP1_MAX, 0x1000, false)]
#[case::low_memory(0x1000_0000, 0x1000, false)]
#[case::largest_window(GP0_MIN, MAX_WINDOW_SIZE, true)]
#[case::oversized_window(GP0_MIN, MAX_WINDOW_SIZE + 1, false)]
fn window_bounds(#[case] base: u64, #[case] size: u64, #[case] accepted: bool) {
    let res = validate_window(base, size);
    if accepted {
        assert!(res.is_ok(), "{base:#x}+{size:#x} should be accepted: {res:?}");
    } else {
        expect_error(&res, "PhantomError::AddressRange");
    }
}

#[gtest]
fn open_all_opens_every_slot() {
    let board = FakeBoard::new();
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    assert_eq!(registry.open_count(), NUM_UIO_DEVS);
    assert_eq!(registry.mapped_count(), 0);
    assert_eq!(board.driver_loads(), 0);
    assert_eq!(board.delay.calls(), 0);
}

#[gtest]
fn open_all_loads_driver_and_retries() {
    let board = FakeBoard::new();
    board.remove_node(17);
    let mut registry = board.registry();
    registry.open_all().expect("the driver brings the node back");
    assert_eq!(registry.open_count(), NUM_UIO_DEVS);
    assert_eq!(board.driver_loads(), 1);
    assert_eq!(board.delay.calls(), 1);
    assert_eq!(board.delay.total(), board.config.driver_settle);
}

#[gtest]
fn open_all_second_failure_closes_everything() {
    let mut board = FakeBoard::new();
    board.driver_restores_nodes = false;
    board.remove_node(31);
    let mut registry = board.registry();
    let res = registry.open_all();
    expect_error(&res, "PhantomError::DeviceOpen");
    assert_eq!(registry.open_count(), 0);
    assert_eq!(board.driver_loads(), 1);
}

#[gtest]
fn map_outside_bus_windows_leaves_state_unchanged() {
    let board = FakeBoard::new();
    board.advertise(0, 0x1000_0000, 0x1000);
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");

    let res = registry.map(0x1000_0000, 0x1000);
    expect_error(&res, "PhantomError::AddressRange");
    assert_eq!(registry.mapped_count(), 0);
    assert_eq!(registry.open_count(), NUM_UIO_DEVS);
}

#[gtest]
fn second_map_of_same_slot_conflicts() {
    let board = FakeBoard::new();
    board.advertise(4, ADDER_BASE, ADDER_SIZE);
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");

    let handle = registry.map(ADDER_BASE, ADDER_SIZE).expect("first map succeeds");
    assert_eq!(handle.slot(), 4);
    let res = registry.map(ADDER_BASE, ADDER_SIZE);
    expect_error(&res, "PhantomError::MappingConflict");
    assert_eq!(registry.mapped_count(), 1);
}

#[gtest]
fn map_of_unadvertised_address_is_not_found() {
    let board = FakeBoard::new();
    board.advertise(4, ADDER_BASE, ADDER_SIZE);
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    let res = registry.map(FIR_BASE, FIR_SIZE);
    expect_error(&res, "PhantomError::DeviceNotFound");
}

#[gtest]
fn map_before_open_is_not_found() {
    let board = FakeBoard::new();
    board.advertise(4, ADDER_BASE, ADDER_SIZE);
    let mut registry = board.registry();
    let res = registry.map(ADDER_BASE, ADDER_SIZE);
    expect_error(&res, "PhantomError::DeviceNotFound");
}

#[gtest]
fn garbled_descriptor_is_skipped() {
    let board = FakeBoard::new();
    board.advertise(9, FIR_BASE, FIR_SIZE);
    fs::write(board.config.device_paths().map_addr_file(2), "not-an-address\n")
        .expect("failed to garble descriptor");
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    let handle = registry.map(FIR_BASE, FIR_SIZE).expect("slot 9 still matches");
    assert_eq!(handle.slot(), 9);
}

#[gtest]
fn missing_descriptor_is_io_error() {
    let board = FakeBoard::new();
    fs::remove_file(board.config.device_paths().map_addr_file(0))
        .expect("failed to remove descriptor");
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    let res = registry.map(ADDER_BASE, ADDER_SIZE);
    expect_error(&res, "PhantomError::IORead");
}

#[gtest]
fn mapped_region_reaches_the_device() {
    let board = FakeBoard::new();
    board.advertise(6, FIR_BASE, FIR_SIZE);
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    let handle = registry.map(FIR_BASE, FIR_SIZE).expect("map succeeds");

    let region = registry.region(handle).expect("live region");
    assert_eq!(region.len(), FIR_SIZE as usize);
    region.write::<u32>(0x10, 0xdead_beef).expect("in bounds");
    assert_eq!(region.read::<u32>(0x10).ok(), Some(0xdead_beef));
    expect_error(&region.read::<u32>(FIR_SIZE as usize), "PhantomError::AddressRange");
    expect_error(&region.read::<u32>(0x11), "PhantomError::AddressRange");

    drop(registry);
    let node = fs::read(board.node(6)).expect("node is readable");
    assert_eq!(&node[0x10..0x14], &0xdead_beef_u32.to_ne_bytes());
}

#[gtest]
fn slots_stay_claimed_until_closed() {
    let board = FakeBoard::new();
    board.advertise(1, ADDER_BASE, ADDER_SIZE);
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    let handle = registry.map(ADDER_BASE, ADDER_SIZE).expect("map succeeds");

    registry.unmap_all(&mut []);
    assert_eq!(registry.mapped_count(), 0);
    assert!(registry.region(handle).is_none());
    // Unmapping again is harmless.
    registry.unmap_all(&mut []);
    assert_eq!(registry.mapped_count(), 0);

    let res = registry.map(ADDER_BASE, ADDER_SIZE);
    expect_error(&res, "PhantomError::MappingConflict");

    registry.close_all();
    assert_eq!(registry.open_count(), 0);
    registry.open_all().expect("all nodes exist");
    let handle = registry.map(ADDER_BASE, ADDER_SIZE).expect("slot available again");
    assert_eq!(handle.slot(), 1);
}

#[gtest]
fn oversized_request_still_maps() {
    let board = FakeBoard::new();
    // Node advertises less than the document asks for; the file is big enough to back it.
    board.advertise(2, FIR_BASE, NODE_LEN * 4);
    fs::write(board.config.device_paths().map_size_file(2), "0x1000\n")
        .expect("failed to shrink advertised size");
    let mut registry = board.registry();
    registry.open_all().expect("all nodes exist");
    assert!(registry.map(FIR_BASE, NODE_LEN * 4).is_ok());
}
