use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plans::PlanTier;

/// unique identifier for a tenant (dealership)
pub type TenantId = Uuid;

/// unique identifier for a dealer group
pub type GroupId = Uuid;

/// tenor options offered by the credit forms
pub const STANDARD_TENORS: [u32; 8] = [6, 12, 18, 24, 30, 36, 48, 60];

/// longest tenor accepted anywhere, fifty years
pub const MAX_TERM_MONTHS: u32 = 600;

pub fn is_standard_tenor(term_months: u32) -> bool {
    STANDARD_TENORS.contains(&term_months)
}

/// a dealership tenant and the plan it is subscribed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub plan: PlanTier,
}

impl Tenant {
    pub fn new(name: impl Into<String>, plan: PlanTier) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            plan,
        }
    }
}

/// installment formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentFormula {
    /// level payment, interest on the declining balance
    Annuity,
    /// flat interest on the original principal for the whole term
    FlatRate,
}

/// client surface a quote is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditSurface {
    /// transaction flow of the web dashboard
    WebTransaction,
    /// credit simulation screen of the mobile app
    MobileSimulation,
}

/// how a sale is financed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
    Leasing,
    Bank,
    InHouse,
}

/// role inside a dealer group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    Owner,
    Member,
}
