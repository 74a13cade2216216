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

//! Bounded busy-wait polling.
//!
//! The fabric offers no completion interrupt to user space, so status bits are polled. Waits
//! block the calling thread for at most `max_iterations * interval` and cannot be cancelled.

use crate::error::PhantomError;
use log::trace;
use std::time::Duration;

/// A source of delays. Swappable so tests can run polling loops without real time passing.
pub trait Delay: Send + Sync {
    fn delay(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Evaluate `condition` up to `max_iterations` times, waiting `interval` between attempts.
///
/// # Returns: `Result<u32, PhantomError>`
/// * `Ok(u32)` - Zero-based iteration on which the condition held
/// * `Err(PhantomError::Timeout)` - The condition never held
/// * `Err(..)` - Whatever error `condition` itself returned
pub fn poll_until<F>(
    description: &str,
    mut condition: F,
    max_iterations: u32,
    interval: Duration,
    delay: &dyn Delay,
) -> Result<u32, PhantomError>
where
    F: FnMut() -> Result<bool, PhantomError>,
{
    for iteration in 0..max_iterations {
        if condition()? {
            trace!("{description} after {iteration} polls");
            return Ok(iteration);
        }
        delay.delay(interval);
    }
    Err(PhantomError::Timeout(format!(
        "{description} not observed within {max_iterations} polls of {interval:?}"
    )))
}
