use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::plans::{FeatureKey, Limit, PlanTier};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreditError {
    #[error("negative amount for {field}: {amount}")]
    NegativeAmount {
        field: &'static str,
        amount: Money,
    },

    #[error("down payment {down_payment} exceeds vehicle price {vehicle_price}")]
    DownPaymentExceedsPrice {
        vehicle_price: Money,
        down_payment: Money,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid term: {term_months} months")]
    InvalidTerm {
        term_months: i64,
    },

    #[error("amounts out of range for principal {principal}")]
    AmountOutOfRange {
        principal: Money,
    },

    #[error("leasing credit requires a leasing company")]
    MissingLeasingCompany,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("feature {feature:?} not available on plan {tier:?}")]
    FeatureNotAvailable {
        tier: PlanTier,
        feature: FeatureKey,
    },

    #[error("plan limit reached for {feature:?} on {tier:?}: limit {limit}, current {current}")]
    PlanLimitReached {
        tier: PlanTier,
        feature: FeatureKey,
        limit: Limit,
        current: u32,
    },

    #[error("unknown plan tier: {value}")]
    UnknownPlanTier {
        value: String,
    },

    #[error("group name must not be blank")]
    BlankGroupName,

    #[error("tenant {tenant_id} already belongs to group {group_id}")]
    AlreadyInGroup {
        tenant_id: Uuid,
        group_id: Uuid,
    },

    #[error("invalid invite code: {code}")]
    InvalidInviteCode {
        code: String,
    },

    #[error("tenant {tenant_id} is not a member of any group")]
    NotAGroupMember {
        tenant_id: Uuid,
    },

    #[error("tenant {tenant_id} does not own group {group_id}")]
    NotGroupOwner {
        tenant_id: Uuid,
        group_id: Uuid,
    },

    #[error("group owner cannot leave group {group_id}, dissolve it instead")]
    OwnerCannotLeave {
        group_id: Uuid,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl From<serde_json::Error> for CreditError {
    fn from(err: serde_json::Error) -> Self {
        CreditError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CreditError>;
