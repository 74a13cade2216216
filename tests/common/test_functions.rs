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

use googletest::prelude::*;
use phantom::error::PhantomError;
use std::result::Result;

pub fn compare_result(res: &Result<String, PhantomError>, exp: &Result<&str, &str>) {
    match (res, exp) {
        (Ok(res_s), Ok(exp_s)) => {
            assert_that!(
                res_s.to_string(),
                contains_substring(exp_s.to_string()),
                "Mismatched result"
            );
        }
        (Err(res_err), Err(exp_err)) => {
            assert_that!(
                res_err.to_string(),
                contains_substring(exp_err.to_string()),
                "Mismatched error signature"
            );
        }
        (res, exp) => {
            panic!("Result mismatch: got {res:?}, expected {exp:?}");
        }
    }
}

/// Fail unless `res` is an error whose message contains `exp`, e.g. `"PhantomError::Timeout"`.
pub fn expect_error<T>(res: &Result<T, PhantomError>, exp: &str) {
    match res {
        Ok(_) => panic!("Expected an error containing {exp:?}, got Ok"),
        Err(e) => assert_that!(
            e.to_string(),
            contains_substring(exp.to_string()),
            "Mismatched error signature"
        ),
    }
}
