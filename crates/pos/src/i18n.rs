//! User-facing wording.
//!
//! Message ids are the English source strings; a [`Translator`] maps them to
//! the session language. Placeholders (`{product}`, `{requested}`,
//! `{available}`) are filled after translation.

use core::str::FromStr;
use std::sync::Arc;

use stockguard_core::DomainError;
use stockguard_inventory::Violation;

pub const TITLE_NOT_ENOUGH_STOCK: &str = "Not enough stock";
pub const PAYMENT_HEADER: &str = "The following products do not have enough stock:";
pub const PAYMENT_LINE: &str = "{product}: requested {requested}, available {available}";
pub const ADD_LINE_BODY: &str =
    "Cannot add \"{product}\": requested {requested}, only {available} available.";
pub const QUANTITY_BODY: &str =
    "Cannot set the quantity of \"{product}\": requested {requested}, only {available} available.";

pub const TITLE_INVALID_QUANTITY: &str = "Invalid quantity";
pub const INVALID_QUANTITY_BODY: &str = "\"{input}\" is not a valid quantity.";

/// Localization capability.
pub trait Translator: Send + Sync {
    fn translate(&self, msgid: &str) -> String;
}

/// Returns message ids unchanged (English).
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceCatalog;

impl Translator for SourceCatalog {
    fn translate(&self, msgid: &str) -> String {
        msgid.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VietnameseCatalog;

impl Translator for VietnameseCatalog {
    fn translate(&self, msgid: &str) -> String {
        let translated = match msgid {
            TITLE_NOT_ENOUGH_STOCK => "Không đủ tồn kho",
            PAYMENT_HEADER => "Các sản phẩm sau không đủ tồn kho:",
            PAYMENT_LINE => "{product}: yêu cầu {requested}, tồn kho {available}",
            ADD_LINE_BODY => "Không thể thêm \"{product}\": yêu cầu {requested}, chỉ còn {available}.",
            QUANTITY_BODY => {
                "Không thể đặt số lượng cho \"{product}\": yêu cầu {requested}, chỉ còn {available}."
            }
            TITLE_INVALID_QUANTITY => "Số lượng không hợp lệ",
            INVALID_QUANTITY_BODY => "\"{input}\" không phải là số lượng hợp lệ.",
            other => other,
        };
        translated.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub fn catalog(self) -> Arc<dyn Translator> {
        match self {
            Locale::En => Arc::new(SourceCatalog),
            Locale::Vi => Arc::new(VietnameseCatalog),
        }
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s.trim().split(['_', '-']).next().unwrap_or_default();
        match language.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "vi" => Ok(Locale::Vi),
            _ => Err(DomainError::validation(format!("unsupported locale `{s}`"))),
        }
    }
}

/// Quantity as shown to the cashier: at most three decimals, no trailing zeros.
pub fn format_quantity(quantity: f64) -> String {
    let fixed = format!("{quantity:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Fill the placeholders of an already translated template.
///
/// Substituted values are never scanned again, so a product name containing
/// `{requested}` is shown literally.
pub fn fill(template: &str, violation: &Violation) -> String {
    let mut filled = String::with_capacity(template.len() + violation.product_name.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };

        match &tail[1..close] {
            "product" => filled.push_str(&violation.product_name),
            "requested" => filled.push_str(&format_quantity(violation.requested)),
            "available" => filled.push_str(&format_quantity(violation.available)),
            _ => filled.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    filled.push_str(rest);
    filled
}
