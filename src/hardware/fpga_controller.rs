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

//! FPGA configuration and programmable logic reset.
//!
//! The controller drives two fixed SoC register blocks directly through physical memory:
//! the device configuration interface (DEVCFG) for clearing the fabric, and the system level
//! control registers (SLCR) for pulsing the fabric reset lines. Each operation maps its block,
//! runs its register sequence and drops the mapping before returning.
//!
//! None of these sequences are atomic with respect to each other. Callers that share a
//! controller must serialise access themselves.

use crate::error::PhantomError;
use crate::hardware::mapped_region::RegisterBlock;
use crate::hardware::physical_memory::PhysicalMemory;
use crate::hardware::poll::{Delay, poll_until};
use crate::system_io::{fs_copy, fs_read_token};
use log::{debug, info, trace};
use std::ops::BitOr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEVCFG_BASE: u64 = 0xf800_7000;
pub const DEVCFG_MAP_LEN: usize = 0x100;
pub const DEVCFG_CTRL: usize = 0x00;
pub const DEVCFG_STATUS: usize = 0x14;
pub const PCFG_PROG_B: u32 = 1 << 30;
pub const PCFG_INIT: u32 = 1 << 4;

pub const SLCR_BASE: u64 = 0xf800_0000;
pub const SLCR_MAP_LEN: usize = 0x1000;
pub const SLCR_FPGA_RST_CTRL: usize = 0x240;

pub const POLL_ITERATIONS: u32 = 1000;
pub const POLL_INTERVAL: Duration = Duration::from_micros(1);
pub const RESET_PULSE: Duration = Duration::from_nanos(100);

/// A set of the four fabric reset lines (FCLKRESETN0..3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetLines(u8);

impl ResetLines {
    pub const FCLK0: ResetLines = ResetLines(1 << 0);
    pub const FCLK1: ResetLines = ResetLines(1 << 1);
    pub const FCLK2: ResetLines = ResetLines(1 << 2);
    pub const FCLK3: ResetLines = ResetLines(1 << 3);
    pub const ALL: ResetLines = ResetLines(0x0f);

    /// Wrap a raw mask. Bits above line 3 are kept so [`FpgaController::reset`] can reject them.
    pub const fn from_bits(bits: u8) -> ResetLines {
        ResetLines(bits)
    }

    /// Mask for line `n`, if `n` names one of the four lines.
    pub fn line(n: u8) -> Option<ResetLines> {
        (n < 4).then(|| ResetLines(1 << n))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 & !Self::ALL.0 == 0
    }
}

impl BitOr for ResetLines {
    type Output = ResetLines;

    fn bitor(self, rhs: ResetLines) -> ResetLines {
        ResetLines(self.0 | rhs.0)
    }
}

pub struct FpgaController {
    config_sink: PathBuf,
    done_file: PathBuf,
    memory: Box<dyn PhysicalMemory>,
    delay: Arc<dyn Delay>,
}

impl FpgaController {
    pub fn new(
        config_sink: &Path,
        done_file: &Path,
        memory: Box<dyn PhysicalMemory>,
        delay: Arc<dyn Delay>,
    ) -> FpgaController {
        FpgaController {
            config_sink: config_sink.to_owned(),
            done_file: done_file.to_owned(),
            memory,
            delay,
        }
    }

    /// Stream a configuration image into the fabric and confirm DONE.
    ///
    /// # Returns: `Result<(), PhantomError>`
    /// * `Ok(())` - Image copied and DONE asserted
    /// * `Err(PhantomError::IOOpen | IOCopy)` - Image or configuration sink unusable
    /// * `Err(PhantomError::NotConfigured)` - Image copied but DONE stayed low
    pub fn configure(&self, image: &Path) -> Result<(), PhantomError> {
        info!("Configuring FPGA with {image:?}");
        let copied = fs_copy(image, &self.config_sink)?;
        debug!("Wrote {copied} bytes to {:?}", self.config_sink);
        if !self.is_done()? {
            return Err(PhantomError::NotConfigured(format!(
                "{image:?} was written to {:?} but {:?} does not report 1",
                self.config_sink, self.done_file
            )));
        }
        info!("FPGA configured");
        Ok(())
    }

    /// Whether the fabric reports a loaded configuration.
    pub fn is_done(&self) -> Result<bool, PhantomError> {
        let done = fs_read_token(&self.done_file)?;
        trace!("FPGA DONE reads {done:?}");
        Ok(done == "1")
    }

    /// Clear the fabric configuration by cycling PROG_B. DONE drops as a result.
    ///
    /// # Returns: `Result<(), PhantomError>`
    /// * `Ok(())` - INIT went low and came back high
    /// * `Err(PhantomError::Timeout)` - INIT did not follow PROG_B within the poll budget
    pub fn configuration_reset(&self) -> Result<(), PhantomError> {
        info!("Resetting FPGA configuration");
        let devcfg = self.memory.map_block(DEVCFG_BASE, DEVCFG_MAP_LEN)?;
        let mut ctrl = devcfg.read32(DEVCFG_CTRL)?;
        ctrl |= PCFG_PROG_B;
        devcfg.write32(DEVCFG_CTRL, ctrl)?;
        ctrl &= !PCFG_PROG_B;
        devcfg.write32(DEVCFG_CTRL, ctrl)?;
        poll_until(
            "PCFG_INIT low",
            || init_is(devcfg.as_ref(), false),
            POLL_ITERATIONS,
            POLL_INTERVAL,
            self.delay.as_ref(),
        )?;

        ctrl |= PCFG_PROG_B;
        devcfg.write32(DEVCFG_CTRL, ctrl)?;
        poll_until(
            "PCFG_INIT high",
            || init_is(devcfg.as_ref(), true),
            POLL_ITERATIONS,
            POLL_INTERVAL,
            self.delay.as_ref(),
        )?;
        Ok(())
    }

    /// Pulse the given fabric reset lines.
    ///
    /// Completion is not observed; the lines are released after [`RESET_PULSE`].
    pub fn reset(&self, lines: ResetLines) -> Result<(), PhantomError> {
        if !lines.is_valid() {
            return Err(PhantomError::Argument(format!(
                "reset mask {:#x} names lines other than FCLKRESETN0..3",
                lines.bits()
            )));
        }
        debug!("Pulsing reset lines {:#x}", lines.bits());
        let slcr = self.memory.map_block(SLCR_BASE, SLCR_MAP_LEN)?;
        slcr.write32(SLCR_FPGA_RST_CTRL, u32::from(lines.bits()))?;
        self.delay.delay(RESET_PULSE);
        slcr.write32(SLCR_FPGA_RST_CTRL, 0)
    }

    pub fn reset_global(&self) -> Result<(), PhantomError> {
        self.reset(ResetLines::ALL)
    }
}

fn init_is(devcfg: &dyn RegisterBlock, high: bool) -> Result<bool, PhantomError> {
    Ok((devcfg.read32(DEVCFG_STATUS)? & PCFG_INIT != 0) == high)
}
