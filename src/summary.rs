//! A serializable snapshot of a session, and its text rendering for the terminal.

use crate::model::{Amount, Catalog, Suggestion};
use crate::session::RequestState;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One selected denomination with its count and subtotal.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct InventoryLine {
    pub id: String,
    pub label: String,
    pub value: Amount,
    pub count: u64,
    pub subtotal: Amount,
}

/// Everything derived from a session at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: Amount,
    /// The target field exactly as it reads.
    pub target_text: String,
    /// The target as used for the derived numbers (zero when unusable).
    pub target: Amount,
    pub remaining: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub progress_percent: Decimal,
    /// Number of distinct denominations selected.
    pub distinct: usize,
    pub inventory: Vec<InventoryLine>,
    pub suggestion: Option<Suggestion>,
    pub request: RequestState,
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total value: {}", self.total)?;
        if self.target.is_positive() {
            if self.remaining.is_zero() {
                writeln!(f, "Target {} reached!", self.target)?;
            } else {
                writeln!(
                    f,
                    "Target {}: {} still needed ({}%)",
                    self.target,
                    self.remaining,
                    self.progress_percent.round_dp(0)
                )?;
            }
        } else if !self.target_text.is_empty() {
            writeln!(f, "Target '{}' is not a usable amount", self.target_text)?;
        }

        if let RequestState::InFlight { .. } = self.request {
            writeln!(f, "Asking for a postage suggestion...")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "{}", SuggestionDisplay(suggestion))?;
        }

        if !self.inventory.is_empty() {
            writeln!(f, "Inventory ({} denominations):", self.distinct)?;
            for line in &self.inventory {
                writeln!(
                    f,
                    "  {:>6} x{:<4} {:>10}",
                    line.label,
                    line.count,
                    line.subtotal.to_string()
                )?;
            }
        }
        Ok(())
    }
}

/// Renders a suggestion as a short block of text.
pub struct SuggestionDisplay<'a>(pub &'a Suggestion);

impl Display for SuggestionDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        writeln!(f, "Suggestion: {} ({}) {}", s.category, s.weight, s.price)?;
        writeln!(f, "  {}", s.description)?;
        for tip in &s.tips {
            writeln!(f, "  - {tip}")?;
        }
        Ok(())
    }
}

/// Renders the denomination catalog, one entry per line.
pub struct CatalogDisplay<'a>(pub &'a Catalog);

impl Display for CatalogDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for d in self.0.iter() {
            writeln!(f, "  {:<5} {:>8}", d.id, d.value.to_string())?;
        }
        Ok(())
    }
}
