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

use crate::common::fakes::{DEVCFG_CTRL_AT_BOOT, FakeBoard, FakeMemory, InitLine};
use crate::common::test_functions::expect_error;
use googletest::prelude::*;
use phantom::hardware::fpga_controller::{
    DEVCFG_BASE, DEVCFG_CTRL, DEVCFG_MAP_LEN, PCFG_PROG_B, POLL_INTERVAL, POLL_ITERATIONS,
    RESET_PULSE, ResetLines, SLCR_BASE, SLCR_FPGA_RST_CTRL, SLCR_MAP_LEN,
};
use rstest::*;

const IMAGE: &[u8] = b"\xaa\x99\x55\x66 not really a bitstream";

#[gtest]
fn configure_streams_image_and_checks_done() {
    let board = FakeBoard::new();
    let image = board.config.bitfile_dir().join("top.bit");
    std::fs::write(&image, IMAGE).expect("failed to write image");
    board.set_done("1");

    let controller = board.controller();
    controller.configure(&image).expect("DONE reads 1");
    assert_eq!(board.configured_image(), IMAGE);
    assert_eq!(controller.is_done().ok(), Some(true));
}

#[gtest]
fn configure_without_done_is_not_configured() {
    let board = FakeBoard::new();
    let image = board.config.bitfile_dir().join("top.bit");
    std::fs::write(&image, IMAGE).expect("failed to write image");
    board.set_done("0");

    let res = board.controller().configure(&image);
    expect_error(&res, "PhantomError::NotConfigured");
    assert!(!res.is_err_and(|e| e.is_io()));
    // The copy itself went through.
    assert_eq!(board.configured_image(), IMAGE);
}

#[gtest]
fn configure_with_missing_image_is_io_error() {
    let board = FakeBoard::new();
    let res = board
        .controller()
        .configure(&board.config.bitfile_dir().join("absent.bit"));
    expect_error(&res, "PhantomError::IOOpen");
    assert!(res.is_err_and(|e| e.is_io()));
}

#[gtest]
#[rstest]
#[case::set("1", true)]
#[case::clear("0", false)]
#[case::padded(" 1 ", true)]
fn done_flag(#[case] contents: &str, #[case] expected: bool) {
    let board = FakeBoard::new();
    board.set_done(contents);
    assert_eq!(board.controller().is_done().ok(), Some(expected));
}

#[gtest]
fn configuration_reset_cycles_prog_b() {
    let board = FakeBoard::new();
    board
        .controller()
        .configuration_reset()
        .expect("INIT follows PROG_B");

    assert_eq!(board.memory.blocks(), vec![(DEVCFG_BASE, DEVCFG_MAP_LEN)]);
    let high = DEVCFG_CTRL_AT_BOOT | PCFG_PROG_B;
    let low = DEVCFG_CTRL_AT_BOOT & !PCFG_PROG_B;
    assert_eq!(
        board.memory.writes(),
        vec![
            (DEVCFG_BASE, DEVCFG_CTRL, high),
            (DEVCFG_BASE, DEVCFG_CTRL, low),
            (DEVCFG_BASE, DEVCFG_CTRL, high),
        ]
    );
    assert_eq!(board.memory.devcfg_ctrl(), high);
    // INIT followed at once, so nothing was waited for.
    assert_eq!(board.delay.calls(), 0);
}

#[gtest]
#[rstest]
#[case::init_never_falls(true, 2)]
#[case::init_never_rises(false, 3)]
fn configuration_reset_times_out(#[case] stuck_at: bool, #[case] writes: usize) {
    let mut board = FakeBoard::new();
    board.memory = FakeMemory::new(InitLine::Stuck(stuck_at));

    let res = board.controller().configuration_reset();
    expect_error(&res, "PhantomError::Timeout");
    assert_eq!(board.memory.writes().len(), writes);
    assert_eq!(board.delay.calls(), POLL_ITERATIONS);
    assert_eq!(board.delay.total(), POLL_INTERVAL * POLL_ITERATIONS);
}

#[gtest]
#[rstest]
#[case::fclk0(ResetLines::FCLK0, 0x1)]
#[case::fclk1_and_3(ResetLines::FCLK1 | ResetLines::FCLK3, 0xa)]
#[case::all(ResetLines::ALL, 0xf)]
fn reset_pulses_lines(#[case] lines: ResetLines, #[case] mask: u32) {
    let board = FakeBoard::new();
    board.controller().reset(lines).expect("valid mask");
    assert_eq!(board.memory.blocks(), vec![(SLCR_BASE, SLCR_MAP_LEN)]);
    assert_eq!(
        board.memory.writes(),
        vec![
            (SLCR_BASE, SLCR_FPGA_RST_CTRL, mask),
            (SLCR_BASE, SLCR_FPGA_RST_CTRL, 0),
        ]
    );
    assert_eq!(board.delay.calls(), 1);
    assert_eq!(board.delay.total(), RESET_PULSE);
}

#[gtest]
fn reset_global_pulses_every_line() {
    let board = FakeBoard::new();
    board.controller().reset_global().expect("valid mask");
    assert_eq!(
        board.memory.writes().first(),
        Some(&(SLCR_BASE, SLCR_FPGA_RST_CTRL, 0xf))
    );
}

#[gtest]
#[rstest]
#[case::unknown_line(0x10)]
#[case::everything(0xff)]
fn reset_rejects_unknown_lines(#[case] bits: u8) {
    let board = FakeBoard::new();
    let res = board.controller().reset(ResetLines::from_bits(bits));
    expect_error(&res, "PhantomError::Argument");
    assert!(board.memory.writes().is_empty());
    assert!(board.memory.blocks().is_empty());
}
