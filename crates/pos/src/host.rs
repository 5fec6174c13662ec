//! Capabilities the host POS client provides to the adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockguard_sales::Order;

use crate::i18n::Locale;

/// Modal alert presentation.
pub trait Dialogs: Send + Sync {
    fn alert(&self, title: &str, body: &str);
}

/// Parser for quantities typed by the cashier.
pub trait NumberParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<f64>;
}

/// Locale-aware quantity parser.
///
/// Accepts `.` or `,` as decimal separator. When both appear, the last one is
/// the decimal separator and the other groups thousands. A separator that
/// appears more than once groups thousands. A single occurrence of the
/// locale's grouping separator followed by exactly three digits groups
/// thousands too (`1,000` in English, `1.000` in Vietnamese); otherwise it is
/// the decimal separator. Malformed groups (`1,00,0`) are rejected.
#[derive(Debug, Clone, Copy)]
pub struct DefaultNumberParser {
    group: char,
}

impl Default for DefaultNumberParser {
    fn default() -> Self {
        Self::for_locale(Locale::En)
    }
}

impl DefaultNumberParser {
    pub fn for_locale(locale: Locale) -> Self {
        let group = match locale {
            Locale::En => ',',
            Locale::Vi => '.',
        };
        Self { group }
    }

    fn decimal_separator(&self, text: &str) -> Option<char> {
        match (text.rfind('.'), text.rfind(',')) {
            (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
            (Some(_), None) => self.lone_separator(text, '.'),
            (None, Some(_)) => self.lone_separator(text, ','),
            (None, None) => None,
        }
    }

    /// Decimal role of `sep` when it is the only separator kind in `text`.
    fn lone_separator(&self, text: &str, sep: char) -> Option<char> {
        if text.matches(sep).count() > 1 {
            return None;
        }
        let after = text.rsplit(sep).next().unwrap_or_default();
        let grouping = sep == self.group && after.len() == 3 && after.chars().all(|c| c.is_ascii_digit());
        (!grouping).then_some(sep)
    }
}

fn other_separator(sep: char) -> char {
    if sep == '.' { ',' } else { '.' }
}

/// Drop well-formed thousands separators from an integer part.
fn ungroup(integer: &str, group: char) -> Option<String> {
    if !integer.contains(group) {
        return Some(integer.to_string());
    }

    let digits = integer.trim_start_matches(['-', '+']);
    let sign = &integer[..integer.len() - digits.len()];
    let mut chunks = digits.split(group);
    let lead = chunks.next().unwrap_or_default();
    let well_formed = (1..=3).contains(&lead.len())
        && digits.chars().all(|c| c.is_ascii_digit() || c == group)
        && chunks.all(|chunk| chunk.len() == 3);

    well_formed.then(|| format!("{sign}{}", digits.replace(group, "")))
}

impl NumberParser for DefaultNumberParser {
    fn parse(&self, text: &str) -> Option<f64> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }

        let normalized = match self.decimal_separator(&compact) {
            Some(decimal) => {
                let (integer, fraction) = compact.rsplit_once(decimal)?;
                if !fraction.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                format!("{}.{fraction}", ungroup(integer, other_separator(decimal))?)
            }
            None if compact.contains(',') => ungroup(&compact, ',')?,
            None => ungroup(&compact, '.')?,
        };

        normalized.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

/// Structured refusal returned to the host UI instead of performing a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub title: String,
    pub body: String,
}

impl Rejection {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Payment-screen behavior of the host.
#[async_trait]
pub trait PaymentHost: Send + Sync {
    /// The host's own order checks (non-empty order, completed payments,
    /// required customer, ...).
    async fn validate_order(&self, order: &Order) -> bool;

    /// The host's continuation after a successful validation: marks the order
    /// paid, pushes it to the backend and records the sync outcome.
    async fn finalize_validation(&self, order: &mut Order) -> anyhow::Result<()>;
}
