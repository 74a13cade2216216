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

//! Command-line client for the phantomd platform daemon.
//!
//! Every subcommand is a thin wrapper over one or more DBus calls; the daemon owns the
//! platform and performs all hardware access. Integer arguments accept decimal or `0x` hex.
//!
//! # Examples
//!
//! ```bash
//! phantom_cli init
//! phantom_cli configure
//! phantom_cli write 7 0x10 42
//! phantom_cli start 7
//! phantom_cli status
//! phantom_cli read 7 0x18
//! ```

mod control;
mod proxies;
mod status;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error};

#[derive(Parser, Debug)]
#[command(name = "phantom_cli")]
#[command(bin_name = "phantom_cli")]
#[command(version, about = "Control FPGA IP cores through phantomd")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show FPGA DONE and the control status of every core
    Status,
    /// Show the platform the loaded design targets
    Info,
    /// List the cores of the design and their slave windows
    List,
    /// Load the design's bitstream into the FPGA
    Configure,
    /// Clear the FPGA configuration
    ConfigReset,
    /// Pulse fabric reset lines (all four when no --line is given)
    Reset {
        #[arg(long = "line", value_parser = clap::value_parser!(u8).range(0..4))]
        lines: Vec<u8>,
    },
    /// Start a core
    Start {
        #[arg(value_parser = parse_u32)]
        id: u32,
    },
    /// Enable or disable automatic restart of a core
    Autorestart {
        #[arg(value_parser = parse_u32)]
        id: u32,
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Read a core register
    Read {
        #[arg(value_parser = parse_u32)]
        id: u32,
        #[arg(value_parser = parse_u64)]
        offset: u64,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..2))]
        slave: u8,
    },
    /// Write a core register
    Write {
        #[arg(value_parser = parse_u32)]
        id: u32,
        #[arg(value_parser = parse_u64)]
        offset: u64,
        #[arg(value_parser = parse_u64)]
        value: u64,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..2))]
        slave: u8,
    },
    /// (Re)initialise the platform from its configuration document
    Init,
    /// Unmap all cores and close the devices
    Terminate,
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer
fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}' is not a valid integer: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{value:#x} does not fit in 32 bits"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");
    let result = match cli.command {
        Commands::Status => status::status_handler().await,
        Commands::Info => status::info_handler().await,
        Commands::List => status::list_handler().await,
        Commands::Configure => control::configure_handler().await,
        Commands::ConfigReset => control::config_reset_handler().await,
        Commands::Reset { lines } => control::reset_handler(&lines).await,
        Commands::Start { id } => control::start_handler(id).await,
        Commands::Autorestart { id, state } => {
            control::autorestart_handler(id, state == Toggle::On).await
        }
        Commands::Read { id, offset, slave } => status::read_handler(id, slave, offset).await,
        Commands::Write {
            id,
            offset,
            value,
            slave,
        } => control::write_handler(id, slave, offset, value).await,
        Commands::Init => control::init_handler().await,
        Commands::Terminate => control::terminate_handler().await,
    };
    match result {
        Ok(msg) => {
            println!("{msg}");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            Err(e.into())
        }
    }
}
