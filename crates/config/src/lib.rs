// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod config;
mod error;
mod handle;

// Re-export public types
pub use config::{CONFIG_FILE_NAME, Config, ENV_PREFIX};
pub use error::ConfigError;
pub use handle::RuleTableHandle;
