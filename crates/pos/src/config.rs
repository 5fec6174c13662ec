//! Guard configuration.
//!
//! Defaults work out of the box; the environment can override them:
//!
//! - `POS_STOCK_EPSILON`: comparison tolerance (default `1e-6`)
//! - `POS_STOCK_LOCALE`: message language, `en` or `vi` (default `en`)

use std::sync::Arc;

use anyhow::Context;

use stockguard_inventory::{DEFAULT_EPSILON, GuardSettings, StockGuard};

use crate::adapters::PosStockGuard;
use crate::host::{DefaultNumberParser, Dialogs};
use crate::i18n::Locale;

pub const EPSILON_VAR: &str = "POS_STOCK_EPSILON";
pub const LOCALE_VAR: &str = "POS_STOCK_LOCALE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardConfig {
    pub epsilon: f64,
    pub locale: Locale,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            locale: Locale::default(),
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(EPSILON_VAR) {
            let epsilon = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{EPSILON_VAR} must be a number (got `{raw}`)"))?;
            config.epsilon = GuardSettings::new(epsilon)
                .with_context(|| format!("invalid {EPSILON_VAR}"))?
                .epsilon();
        }

        if let Some(raw) = lookup(LOCALE_VAR) {
            config.locale = raw.parse().unwrap_or_else(|err| {
                tracing::warn!(%err, "{LOCALE_VAR} not supported; using English messages");
                Locale::En
            });
        }

        Ok(config)
    }

    pub fn settings(&self) -> anyhow::Result<GuardSettings> {
        GuardSettings::new(self.epsilon).context("invalid guard settings")
    }

    /// Assemble the adapters with this configuration and the host's dialogs.
    pub fn build_guard(&self, dialogs: Arc<dyn Dialogs>) -> anyhow::Result<PosStockGuard> {
        let guard = StockGuard::new(self.settings()?);
        let parser = DefaultNumberParser::for_locale(self.locale);
        Ok(PosStockGuard::new(guard, dialogs, self.locale.catalog()).with_number_parser(Arc::new(parser)))
    }
}
