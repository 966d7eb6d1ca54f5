//! Catalog plan types.
//!
//! The plan catalog is owned by a separate catalog-management process;
//! from the ledger's perspective it is a read-only lookup table keyed by
//! `(category, plan_id)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::PlanId;

/// Catalog plan category (the partition key of the plan table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanCategory {
    /// Mobile data bundles.
    Data,

    /// Voice minutes and SMS bundles.
    VoiceSms,

    /// Combined packs (data + voice + SMS).
    Pack,
}

impl PlanCategory {
    /// Wire/key representation of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::VoiceSms => "VOICE_SMS",
            Self::Pack => "PACK",
        }
    }

    /// All categories, in catalog scan order.
    #[must_use]
    pub fn all() -> [Self; 3] {
        [Self::Data, Self::VoiceSms, Self::Pack]
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DATA" => Ok(Self::Data),
            "VOICE_SMS" => Ok(Self::VoiceSms),
            "PACK" => Ok(Self::Pack),
            other => Err(format!("unknown plan category: {other}")),
        }
    }
}

/// A subscription plan as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlan {
    /// Category of the plan (partition key).
    pub category: PlanCategory,

    /// Plan identifier (sort key), unique across categories.
    pub plan_id: PlanId,

    /// Human-readable plan name.
    pub name: String,

    /// Marketing description.
    pub description: String,

    /// Price in francs. Always > 0.
    pub price: i64,

    /// Validity duration in days. Always > 0.
    pub duration_days: u32,
}

impl CatalogPlan {
    /// Validate catalog invariants (positive price and duration).
    ///
    /// # Errors
    ///
    /// Returns a description of the violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.price <= 0 {
            return Err(format!("plan {}: price must be positive", self.plan_id));
        }
        if self.duration_days == 0 {
            return Err(format!("plan {}: duration must be positive", self.plan_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(price: i64, duration_days: u32) -> CatalogPlan {
        CatalogPlan {
            category: PlanCategory::Data,
            plan_id: "F_D_1GB".parse().unwrap(),
            name: "Data 1GB".into(),
            description: "1GB valid 30 days".into(),
            price,
            duration_days,
        }
    }

    #[test]
    fn category_roundtrip() {
        for category in PlanCategory::all() {
            let parsed: PlanCategory = category.as_str().parse().unwrap();
            assert_eq!(category, parsed);
        }
        assert!("DATA_X".parse::<PlanCategory>().is_err());
    }

    #[test]
    fn category_serde_uses_wire_names() {
        let json = serde_json::to_string(&PlanCategory::VoiceSms).unwrap();
        assert_eq!(json, "\"VOICE_SMS\"");
    }

    #[test]
    fn plan_validation() {
        assert!(plan(2000, 30).validate().is_ok());
        assert!(plan(0, 30).validate().is_err());
        assert!(plan(-5, 30).validate().is_err());
        assert!(plan(2000, 0).validate().is_err());
    }
}
