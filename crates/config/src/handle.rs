// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::Config;
use crate::error::ConfigError;
use crew_ftl_domain::RuleTable;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// A shared, swap-only reference to the rule table in force.
///
/// Readers take an `Arc` snapshot and evaluate a whole month against it, so
/// a concurrent swap never changes the table mid-computation. Tables are
/// only ever replaced whole, never edited in place. Clones share the same
/// slot.
#[derive(Debug, Clone)]
pub struct RuleTableHandle {
    current: Arc<RwLock<Arc<RuleTable>>>,
}

impl RuleTableHandle {
    /// Wraps a validated rule table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRules` if the table fails validation.
    pub fn new(rules: RuleTable) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(rules))),
        })
    }

    /// Loads the rule table from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::new(Config::load_from(path)?.rules)
    }

    /// The table in force right now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in a new table and returns the one it replaced.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRules` if the new table fails validation;
    /// the current table stays in force.
    pub fn replace(&self, rules: RuleTable) -> Result<Arc<RuleTable>, ConfigError> {
        rules.validate()?;
        let next: Arc<RuleTable> = Arc::new(rules);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous: Arc<RuleTable> = std::mem::replace(&mut *guard, next);
        drop(guard);

        tracing::info!(
            previous = %previous.version,
            current = %self.snapshot().version,
            "Replaced FTL rule table"
        );
        Ok(previous)
    }

    /// Reloads configuration from `path` and swaps it in.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid;
    /// the current table stays in force.
    pub fn reload_from(&self, path: &Path) -> Result<Arc<RuleTable>, ConfigError> {
        let config: Config = Config::load_from(path).inspect_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "Keeping current FTL rule table");
        })?;
        self.replace(config.rules)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crew_ftl_domain::Hours;

    fn relabelled(version: &str) -> RuleTable {
        RuleTable {
            version: version.to_string(),
            ..RuleTable::default()
        }
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let handle: RuleTableHandle = RuleTableHandle::new(RuleTable::default()).unwrap();
        let before: Arc<RuleTable> = handle.snapshot();

        let previous: Arc<RuleTable> = handle.replace(relabelled("v2")).unwrap();
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.version, RuleTable::default().version);
        assert_eq!(handle.snapshot().version, "v2");
    }

    #[test]
    fn test_invalid_replacement_keeps_current() {
        let handle: RuleTableHandle = RuleTableHandle::new(relabelled("v1")).unwrap();
        let mut broken: RuleTable = relabelled("v2");
        broken.disruptive.max_fdp_reduction = Hours::from_hm(20, 0);

        assert!(matches!(
            handle.replace(broken),
            Err(ConfigError::InvalidRules(_))
        ));
        assert_eq!(handle.snapshot().version, "v1");
    }

    #[test]
    fn test_invalid_initial_table_rejected() {
        assert!(RuleTableHandle::new(relabelled("  ")).is_err());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let handle: RuleTableHandle = RuleTableHandle::new(relabelled("v1")).unwrap();
        let reader: RuleTableHandle = handle.clone();

        std::thread::scope(|scope| {
            scope.spawn(|| handle.replace(relabelled("v2")).unwrap());
        });
        assert_eq!(reader.snapshot().version, "v2");
    }

    #[test]
    fn test_reload_from_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ftl.toml", "[rules]\nversion = \"reloaded\"\n")?;
            let handle: RuleTableHandle = RuleTableHandle::new(relabelled("v1")).unwrap();
            let previous: Arc<RuleTable> = handle.reload_from(Path::new("ftl.toml")).unwrap();
            assert_eq!(previous.version, "v1");
            assert_eq!(handle.snapshot().version, "reloaded");
            Ok(())
        });
    }
}
