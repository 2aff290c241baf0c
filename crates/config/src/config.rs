// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rule table configuration.
//!
//! Values are merged from, in increasing precedence:
//! 1. `RuleTable::default()`
//! 2. The `[rules]` table of a TOML file
//! 3. Environment variables prefixed with `FTL_`, nested with `__`
//!    (for example `FTL_RULES__MINIMUM_REST__FLOOR=10:00`)
//!
//! The merged table is validated before it is handed out.

use crate::error::ConfigError;
use crew_ftl_domain::RuleTable;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file looked up in the working directory by [`Config::load`].
pub const CONFIG_FILE_NAME: &str = "ftl.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FTL_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The rule table the engine evaluates against.
    pub rules: RuleTable,
}

impl Config {
    /// Loads configuration using `ftl.toml` in the working directory.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the resulting rule
    /// table is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Loads configuration using the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the resulting rule
    /// table is invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.rules.validate()?;

        tracing::info!(
            path = %path.display(),
            version = %config.rules.version,
            fdp_bands = config.rules.fdp_bands.len(),
            "Loaded FTL rule table"
        );
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
