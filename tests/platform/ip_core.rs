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

use crate::common::fakes::{FakeBoard, component, document};
use crate::common::test_functions::expect_error;
use crate::platform::{ADDER_BASE, ADDER_SIZE, DMA_BASE, DMA_SIZE};
use googletest::prelude::*;
use phantom::hardware::RegValue;
use phantom::platform::ip_core::{
    IP_CTRL, IP_CTRL_AUTORESTART, IP_CTRL_DONE, IP_CTRL_IDLE, IP_CTRL_READY, IP_CTRL_START,
};
use phantom::platform::{GENERIC_PLATFORM, Platform};
use rstest::*;

const DMA_SLAVE1_BASE: u64 = 0x8000_1000;
const DMA_SLAVE1_SIZE: u64 = 0x100;

/// adder_0 (id 7) with one slave, dma_0 (id 9) with two.
#[fixture]
fn board() -> FakeBoard {
    let board = FakeBoard::new();
    board.advertise(3, ADDER_BASE, ADDER_SIZE);
    board.advertise(10, DMA_BASE, DMA_SIZE);
    board.advertise(11, DMA_SLAVE1_BASE, DMA_SLAVE1_SIZE);
    board.write_document(&document(
        "0.1",
        GENERIC_PLATFORM,
        &[
            component("adder_0", 7, ADDER_BASE, ADDER_SIZE),
            component("dma_0", 9, DMA_BASE, DMA_SIZE).with_slave1(DMA_SLAVE1_BASE, DMA_SLAVE1_SIZE),
        ],
    ));
    board
}

fn initialise(board: &FakeBoard) -> Platform {
    board.initialise().expect("platform should initialise")
}

#[gtest]
#[rstest]
fn registers_round_trip(board: FakeBoard) {
    let platform = initialise(&board);
    let adder = platform.ip(7).expect("adder present");
    adder.write(0, 0x10, 20).expect("in range");
    adder.write(0, 0x18, 22).expect("in range");
    assert_eq!(adder.try_read(0, 0x10).ok(), Some(20));
    assert_eq!(adder.read(0, 0x18), 22);

    let dma = platform.ip(9).expect("dma present");
    dma.write(1, 0x8, 0x55).expect("slave 1 mapped");
    assert_eq!(dma.read(1, 0x8), 0x55);
    assert_eq!(dma.read(0, 0x8), 0);
}

#[gtest]
#[rstest]
#[case::last_register(0, ADDER_SIZE as usize - 8, None)]
#[case::past_window(0, ADDER_SIZE as usize, Some("PhantomError::AddressRange"))]
#[case::far_past_window(0, 0x10_0000, Some("PhantomError::AddressRange"))]
#[case::unused_slave(1, 0, Some("PhantomError::AddressRange"))]
#[case::no_such_slave(2, 0, Some("PhantomError::AddressRange"))]
fn register_bounds(
    board: FakeBoard,
    #[case] slave: u8,
    #[case] offset: usize,
    #[case] exp: Option<&str>,
) {
    let platform = initialise(&board);
    let adder = platform.ip(7).expect("adder present");
    let write = adder.write(slave, offset, 1);
    let read = adder.try_read(slave, offset);
    match exp {
        None => {
            assert!(write.is_ok());
            assert_eq!(read.ok(), Some(1));
        }
        Some(signature) => {
            expect_error(&write, signature);
            expect_error(&read, signature);
            // The lenient read reports 0 instead.
            assert_eq!(adder.read(slave, offset), 0);
        }
    }
}

#[gtest]
#[rstest]
fn start_preserves_other_bits(board: FakeBoard) {
    let platform = initialise(&board);
    let adder = platform.ip(7).expect("adder present");
    adder.write(0, IP_CTRL, IP_CTRL_AUTORESTART).expect("in range");
    adder.start().expect("control register mapped");
    assert_eq!(
        adder.read(0, IP_CTRL),
        IP_CTRL_AUTORESTART | IP_CTRL_START
    );
}

#[gtest]
#[rstest]
fn autorestart_toggles(board: FakeBoard) {
    let platform = initialise(&board);
    let adder = platform.ip(7).expect("adder present");
    adder.write(0, IP_CTRL, IP_CTRL_IDLE).expect("in range");
    adder.set_autorestart().expect("control register mapped");
    assert_eq!(adder.read(0, IP_CTRL), IP_CTRL_IDLE | IP_CTRL_AUTORESTART);
    adder.clear_autorestart().expect("control register mapped");
    assert_eq!(adder.read(0, IP_CTRL), IP_CTRL_IDLE);
}

#[gtest]
#[rstest]
#[case::running(IP_CTRL_START, false, false, false)]
#[case::done(IP_CTRL_DONE | IP_CTRL_IDLE, true, true, false)]
#[case::ready(IP_CTRL_READY | IP_CTRL_IDLE, false, true, true)]
#[case::all(0xff, true, true, true)]
fn status_bits(
    board: FakeBoard,
    #[case] ctrl: RegValue,
    #[case] done: bool,
    #[case] idle: bool,
    #[case] ready: bool,
) {
    let platform = initialise(&board);
    let adder = platform.ip(7).expect("adder present");
    adder.write(0, IP_CTRL, ctrl).expect("in range");
    assert_eq!(adder.is_done().ok(), Some(done));
    assert_eq!(adder.is_idle().ok(), Some(idle));
    assert_eq!(adder.is_ready().ok(), Some(ready));
}

#[gtest]
#[rstest]
fn cores_share_nothing(board: FakeBoard) {
    let platform = initialise(&board);
    let adder = platform.ip_by_idstring("adder_0").expect("adder present");
    let dma = platform.ip_by_name("dma").expect("dma present");
    adder.write(0, 0x20, 0x1234).expect("in range");
    assert_eq!(dma.read(0, 0x20), 0);
    assert_that!(format!("{adder:?}"), contains_substring("adder_0"));
}
