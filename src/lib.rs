pub mod config;
pub mod credit;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod groups;
pub mod input;
pub mod payments;
pub mod plans;
pub mod quote;
pub mod types;

// re-export key types
pub use config::{CreditConfig, CurrencyConfig, SurfaceBindings};
pub use credit::CreditRecord;
pub use decimal::{Money, Rate};
pub use errors::{CreditError, Result};
pub use events::{Event, EventStore};
pub use groups::{DealerGroup, DealerGroupRegistry, GroupMember};
pub use input::{parse_float, parse_int, QuoteField, QuoteForm, QuoteOutcome};
pub use payments::{
    annuity_payment, compare_formulas, flat_rate_payment, AmortizationSchedule, AnnuityCalculator,
    FlatRateCalculator, FormulaComparison, InstallmentCalculator, ScheduledPayment,
};
pub use plans::{FeatureKey, FeatureValue, Limit, PlanCatalog, PlanFeatures, PlanTier};
pub use quote::{LoanQuote, LoanTerms};
pub use types::{
    is_standard_tenor, CreditSurface, CreditType, GroupId, InstallmentFormula, MemberRole, Tenant,
    TenantId, MAX_TERM_MONTHS, STANDARD_TENORS,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
