// Copyright 2026 genqueue Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for the genqueue binary.
//!
//! ## Usage
//!
//! ```bash
//! genqueue serve            # Read `user: message` chat lines from stdin
//! genqueue config show      # Print effective configuration
//! genqueue config validate  # Check configuration, exit 1 on warnings
//! ```

pub mod config_cmd;
pub mod serve;

pub use serve::{run_serve, ServeSummary, StopReason};
