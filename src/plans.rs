use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{CreditError, Result};

/// subscription tier of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    Demo,
    Basic,
    Pro,
    /// sold as ENTERPRISE on some surfaces
    #[serde(alias = "ENTERPRISE")]
    Unlimited,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [PlanTier::Demo, PlanTier::Basic, PlanTier::Pro, PlanTier::Unlimited];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Demo => "DEMO",
            PlanTier::Basic => "BASIC",
            PlanTier::Pro => "PRO",
            PlanTier::Unlimited => "UNLIMITED",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEMO" => Ok(PlanTier::Demo),
            "BASIC" => Ok(PlanTier::Basic),
            "PRO" => Ok(PlanTier::Pro),
            "UNLIMITED" | "ENTERPRISE" => Ok(PlanTier::Unlimited),
            _ => Err(CreditError::UnknownPlanTier { value: s.to_string() }),
        }
    }
}

/// a numeric plan limit, `-1` on the wire meaning unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    Capped(u32),
}

impl Limit {
    pub const UNLIMITED_SENTINEL: i64 = -1;

    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw == Self::UNLIMITED_SENTINEL {
            return Some(Limit::Unlimited);
        }
        u32::try_from(raw).ok().map(Limit::Capped)
    }

    pub fn as_raw(&self) -> i64 {
        match self {
            Limit::Unlimited => Self::UNLIMITED_SENTINEL,
            Limit::Capped(n) => i64::from(*n),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// whether one more item may be added on top of `current`
    pub fn allows(&self, current: u32) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::Capped(cap) => current < *cap,
        }
    }

    /// room left, `None` when unlimited
    pub fn remaining(&self, current: u32) -> Option<u32> {
        match self {
            Limit::Unlimited => None,
            Limit::Capped(cap) => Some(cap.saturating_sub(current)),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.pad("unlimited"),
            Limit::Capped(n) => f.pad(&n.to_string()),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Limit::from_raw(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid limit {}, expected -1 or a count", raw))
        })
    }
}

/// gated feature keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKey {
    MaxVehicles,
    MaxUsers,
    MaxCustomers,
    MaxGroupMembers,
    CanCreateGroup,
    CanJoinGroup,
    PdfExport,
    CreditSimulation,
}

impl FeatureKey {
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            FeatureKey::MaxVehicles | FeatureKey::MaxUsers | FeatureKey::MaxCustomers | FeatureKey::MaxGroupMembers
        )
    }
}

impl FromStr for FeatureKey {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string())).map_err(|_| {
            CreditError::InvalidConfiguration {
                message: format!("unknown feature key: {}", s),
            }
        })
    }
}

/// value of a feature for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Limit(Limit),
    Flag(bool),
}

impl FeatureValue {
    /// flags as-is, limits when they leave room for at least one item
    pub fn is_enabled(&self) -> bool {
        match self {
            FeatureValue::Flag(enabled) => *enabled,
            FeatureValue::Limit(limit) => limit.allows(0),
        }
    }
}

/// feature table of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub max_vehicles: Limit,
    pub max_users: Limit,
    pub max_customers: Limit,
    pub max_group_members: Limit,
    pub can_create_group: bool,
    pub can_join_group: bool,
    pub pdf_export: bool,
    pub credit_simulation: bool,
}

impl PlanFeatures {
    /// everything off, served for tiers a catalog does not know
    pub const LOCKED: PlanFeatures = PlanFeatures {
        max_vehicles: Limit::Capped(0),
        max_users: Limit::Capped(0),
        max_customers: Limit::Capped(0),
        max_group_members: Limit::Capped(0),
        can_create_group: false,
        can_join_group: false,
        pdf_export: false,
        credit_simulation: false,
    };

    pub fn get(&self, key: FeatureKey) -> FeatureValue {
        match key {
            FeatureKey::MaxVehicles => FeatureValue::Limit(self.max_vehicles),
            FeatureKey::MaxUsers => FeatureValue::Limit(self.max_users),
            FeatureKey::MaxCustomers => FeatureValue::Limit(self.max_customers),
            FeatureKey::MaxGroupMembers => FeatureValue::Limit(self.max_group_members),
            FeatureKey::CanCreateGroup => FeatureValue::Flag(self.can_create_group),
            FeatureKey::CanJoinGroup => FeatureValue::Flag(self.can_join_group),
            FeatureKey::PdfExport => FeatureValue::Flag(self.pdf_export),
            FeatureKey::CreditSimulation => FeatureValue::Flag(self.credit_simulation),
        }
    }

    pub fn demo() -> Self {
        Self {
            max_vehicles: Limit::Capped(10),
            max_users: Limit::Capped(1),
            max_customers: Limit::Capped(25),
            max_group_members: Limit::Capped(0),
            can_create_group: false,
            can_join_group: false,
            pdf_export: false,
            credit_simulation: true,
        }
    }

    pub fn basic() -> Self {
        Self {
            max_vehicles: Limit::Capped(50),
            max_users: Limit::Capped(3),
            max_customers: Limit::Capped(200),
            max_group_members: Limit::Capped(0),
            can_create_group: false,
            can_join_group: true,
            pdf_export: true,
            credit_simulation: true,
        }
    }

    pub fn pro() -> Self {
        Self {
            max_vehicles: Limit::Capped(200),
            max_users: Limit::Capped(10),
            max_customers: Limit::Unlimited,
            max_group_members: Limit::Capped(5),
            can_create_group: true,
            can_join_group: true,
            pdf_export: true,
            credit_simulation: true,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            max_vehicles: Limit::Unlimited,
            max_users: Limit::Unlimited,
            max_customers: Limit::Unlimited,
            max_group_members: Limit::Unlimited,
            can_create_group: true,
            can_join_group: true,
            pdf_export: true,
            credit_simulation: true,
        }
    }
}

/// tier -> feature table lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<PlanTier, PlanFeatures>", into = "BTreeMap<PlanTier, PlanFeatures>")]
pub struct PlanCatalog {
    plans: BTreeMap<PlanTier, PlanFeatures>,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        let plans = BTreeMap::from([
            (PlanTier::Demo, PlanFeatures::demo()),
            (PlanTier::Basic, PlanFeatures::basic()),
            (PlanTier::Pro, PlanFeatures::pro()),
            (PlanTier::Unlimited, PlanFeatures::unlimited()),
        ]);
        Self { plans }
    }
}

impl TryFrom<BTreeMap<PlanTier, PlanFeatures>> for PlanCatalog {
    type Error = CreditError;

    fn try_from(plans: BTreeMap<PlanTier, PlanFeatures>) -> Result<Self> {
        let catalog = Self { plans };
        catalog.validate()?;
        Ok(catalog)
    }
}

impl From<PlanCatalog> for BTreeMap<PlanTier, PlanFeatures> {
    fn from(catalog: PlanCatalog) -> Self {
        catalog.plans
    }
}

impl PlanCatalog {
    pub fn new(plans: BTreeMap<PlanTier, PlanFeatures>) -> Result<Self> {
        Self::try_from(plans)
    }

    /// every tier must be configured
    pub fn validate(&self) -> Result<()> {
        for tier in PlanTier::ALL {
            if !self.plans.contains_key(&tier) {
                return Err(CreditError::InvalidConfiguration {
                    message: format!("plan catalog missing tier {}", tier),
                });
            }
        }
        Ok(())
    }

    pub fn features(&self, tier: PlanTier) -> &PlanFeatures {
        self.plans.get(&tier).unwrap_or(&PlanFeatures::LOCKED)
    }

    pub fn lookup(&self, tier: PlanTier, key: FeatureKey) -> FeatureValue {
        self.features(tier).get(key)
    }

    /// numeric limit, `None` for flag features
    pub fn limit(&self, tier: PlanTier, key: FeatureKey) -> Option<Limit> {
        match self.lookup(tier, key) {
            FeatureValue::Limit(limit) => Some(limit),
            FeatureValue::Flag(_) => None,
        }
    }

    pub fn is_enabled(&self, tier: PlanTier, key: FeatureKey) -> bool {
        self.lookup(tier, key).is_enabled()
    }

    pub fn ensure_enabled(&self, tier: PlanTier, key: FeatureKey) -> Result<()> {
        if self.is_enabled(tier, key) {
            Ok(())
        } else {
            Err(CreditError::FeatureNotAvailable { tier, feature: key })
        }
    }

    /// check that one more item fits on top of `current`; flags behave like `ensure_enabled`
    pub fn ensure_capacity(&self, tier: PlanTier, key: FeatureKey, current: u32) -> Result<()> {
        match self.lookup(tier, key) {
            FeatureValue::Flag(_) => self.ensure_enabled(tier, key),
            FeatureValue::Limit(limit) if limit.allows(current) => Ok(()),
            FeatureValue::Limit(limit) => Err(CreditError::PlanLimitReached {
                tier,
                feature: key,
                limit,
                current,
            }),
        }
    }

    /// room left under a limit; `None` when unlimited or not a limit
    pub fn remaining(&self, tier: PlanTier, key: FeatureKey, current: u32) -> Option<u32> {
        self.limit(tier, key).and_then(|limit| limit.remaining(current))
    }
}
