//! The static catalog of stamp denominations.

use crate::model::Amount;
use crate::Result;
use anyhow::{bail, ensure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A catalog entry representing one stamp face value.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Denomination {
    /// Unique, stable identifier, e.g. `d4`.
    pub id: String,
    /// Face value of one stamp.
    pub value: Amount,
    /// Display text, e.g. `$1.0`.
    pub label: String,
    /// Presentation tag. Carried through for front-ends, not used in any calculation.
    #[serde(default)]
    pub color: String,
}

impl Denomination {
    pub fn new(
        id: impl Into<String>,
        value: Amount,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value,
            label: label.into(),
            color: color.into(),
        }
    }
}

/// A fixed, ordered list of denominations with unique ids. Once built it never changes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    denominations: Vec<Denomination>,
}

impl Catalog {
    /// Validates and wraps `denominations`.
    ///
    /// # Errors
    /// - The list is empty.
    /// - An id is blank or appears more than once.
    /// - A value is zero or negative.
    pub fn new(denominations: Vec<Denomination>) -> Result<Self> {
        ensure!(
            !denominations.is_empty(),
            "The denomination catalog must not be empty"
        );
        let mut seen = HashSet::new();
        for d in &denominations {
            if d.id.trim().is_empty() {
                bail!("A denomination has a blank id");
            }
            if !seen.insert(d.id.as_str()) {
                bail!("Duplicate denomination id '{}'", d.id);
            }
            if !d.value.is_positive() {
                bail!(
                    "Denomination '{}' must have a positive value, got {}",
                    d.id,
                    d.value.canonical()
                );
            }
        }
        Ok(Self { denominations })
    }

    /// Looks up a denomination by id.
    pub fn get(&self, id: &str) -> Option<&Denomination> {
        self.denominations.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Denominations in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Denomination> {
        self.denominations.iter()
    }

    pub fn len(&self) -> usize {
        self.denominations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.denominations.is_empty()
    }
}

impl Default for Catalog {
    /// The seed catalog of common Hong Kong Post definitive stamp values.
    fn default() -> Self {
        Self {
            denominations: SEED
                .iter()
                .map(|(id, cents, label, color)| {
                    Denomination::new(
                        *id,
                        Amount::new(Decimal::new(*cents, 2)),
                        *label,
                        *color,
                    )
                })
                .collect(),
        }
    }
}

/// Seed data: id, value in cents, label, color.
const SEED: &[(&str, i64, &str, &str)] = &[
    ("d1", 10, "$0.1", "slate-100"),
    ("d2", 20, "$0.2", "slate-200"),
    ("d3", 50, "$0.5", "amber-100"),
    ("d4", 100, "$1.0", "emerald-100"),
    ("d5", 170, "$1.7", "sky-100"),
    ("d6", 200, "$2.0", "blue-100"),
    ("d7", 220, "$2.2", "indigo-100"),
    ("d8", 260, "$2.6", "violet-100"),
    ("d9", 280, "$2.8", "purple-100"),
    ("d10", 300, "$3.0", "fuchsia-100"),
    ("d11", 370, "$3.7", "pink-100"),
    ("d12", 400, "$4.0", "rose-100"),
    ("d13", 490, "$4.9", "orange-100"),
    ("d14", 500, "$5.0", "red-100"),
    ("d15", 1000, "$10", "yellow-200"),
    ("d16", 2000, "$20", "lime-200"),
    ("d17", 5000, "$50", "cyan-200"),
];
