// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crew_ftl_domain::DomainError;
use thiserror::Error;

/// Errors raised while loading or swapping a rule table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider could not be read or the merged values did not deserialize.
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    /// The merged rule table failed validation.
    #[error("invalid rule table: {0}")]
    InvalidRules(#[from] DomainError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}
