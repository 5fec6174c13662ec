//! Guarded versions of the host's extension points.

pub mod add_line;
pub mod quantity;
pub mod validation;

use std::sync::Arc;

use stockguard_inventory::{StockGuard, Violation};

use crate::host::{DefaultNumberParser, Dialogs, NumberParser, Rejection};
use crate::i18n::{self, Translator};

/// Stock guard wired to the host's dialog, translation and parsing
/// capabilities.
#[derive(Clone)]
pub struct PosStockGuard {
    guard: StockGuard,
    dialogs: Arc<dyn Dialogs>,
    translator: Arc<dyn Translator>,
    parser: Arc<dyn NumberParser>,
}

impl PosStockGuard {
    pub fn new(guard: StockGuard, dialogs: Arc<dyn Dialogs>, translator: Arc<dyn Translator>) -> Self {
        Self {
            guard,
            dialogs,
            translator,
            parser: Arc::new(DefaultNumberParser::default()),
        }
    }

    pub fn with_number_parser(mut self, parser: Arc<dyn NumberParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn guard(&self) -> &StockGuard {
        &self.guard
    }

    fn translate(&self, msgid: &str) -> String {
        self.translator.translate(msgid)
    }

    fn describe(&self, msgid: &str, violation: &Violation) -> String {
        i18n::fill(&self.translate(msgid), violation)
    }

    fn alert_violation(&self, msgid: &str, violation: &Violation) {
        let title = self.translate(i18n::TITLE_NOT_ENOUGH_STOCK);
        self.dialogs.alert(&title, &self.describe(msgid, violation));
    }

    fn invalid_quantity(&self, text: &str) -> Rejection {
        Rejection::new(
            self.translate(i18n::TITLE_INVALID_QUANTITY),
            self.translate(i18n::INVALID_QUANTITY_BODY)
                .replace("{input}", text.trim()),
        )
    }

    fn rejection(&self, msgid: &str, violation: &Violation) -> Rejection {
        Rejection::new(
            self.translate(i18n::TITLE_NOT_ENOUGH_STOCK),
            self.describe(msgid, violation),
        )
    }
}

impl core::fmt::Debug for PosStockGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PosStockGuard")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
