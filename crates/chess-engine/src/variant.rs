//! Supported chess variants.

use crate::rules::{self, VariantRules};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A chess variant. Serialized in lowercase (`"crazyhouse"`, `"fischerrandom"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    #[serde(alias = "standard")]
    Classic,
    Atomic,
    #[serde(alias = "zh")]
    Crazyhouse,
    Bughouse,
    Suicide,
    Losers,
    #[serde(alias = "chess960")]
    FischerRandom,
    Wild,
}

/// Error returned when a variant name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Classic,
        Variant::Atomic,
        Variant::Crazyhouse,
        Variant::Bughouse,
        Variant::Suicide,
        Variant::Losers,
        Variant::FischerRandom,
        Variant::Wild,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Atomic => "atomic",
            Variant::Crazyhouse => "crazyhouse",
            Variant::Bughouse => "bughouse",
            Variant::Suicide => "suicide",
            Variant::Losers => "losers",
            Variant::FischerRandom => "fischerrandom",
            Variant::Wild => "wild",
        }
    }

    /// The rule overlay for this variant.
    pub fn rules(self) -> &'static dyn VariantRules {
        match self {
            Variant::Classic => &rules::Classic,
            Variant::Atomic => &rules::Atomic,
            Variant::Crazyhouse => &rules::Crazyhouse,
            Variant::Bughouse => &rules::Bughouse,
            Variant::Suicide => &rules::Suicide,
            Variant::Losers => &rules::Losers,
            Variant::FischerRandom => &rules::FischerRandom,
            Variant::Wild => &rules::Wild,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let variant = match lower.as_str() {
            "classic" | "standard" => Variant::Classic,
            "atomic" => Variant::Atomic,
            "crazyhouse" | "zh" => Variant::Crazyhouse,
            "bughouse" => Variant::Bughouse,
            "suicide" => Variant::Suicide,
            "losers" => Variant::Losers,
            "fischerrandom" | "chess960" | "fr" => Variant::FischerRandom,
            "wild" => Variant::Wild,
            _ => return Err(UnknownVariant(s.to_string())),
        };
        Ok(variant)
    }
}
