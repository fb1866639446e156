use serde::{Deserialize, Serialize};

use crate::errors::{CreditError, Result};
use crate::plans::PlanCatalog;
use crate::types::{CreditSurface, InstallmentFormula};

/// credit configuration shared by every client surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreditConfig {
    pub currency: CurrencyConfig,
    pub surfaces: SurfaceBindings,
    pub plans: PlanCatalog,
}

/// currency used for rounding installments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    /// decimal places of the smallest unit, 0 for rupiah
    pub minor_units: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: "IDR".to_string(),
            minor_units: 0,
        }
    }
}

/// which installment formula each client surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceBindings {
    pub web_transaction: InstallmentFormula,
    pub mobile_simulation: InstallmentFormula,
}

impl Default for SurfaceBindings {
    fn default() -> Self {
        Self {
            web_transaction: InstallmentFormula::Annuity,
            mobile_simulation: InstallmentFormula::FlatRate,
        }
    }
}

impl SurfaceBindings {
    pub fn formula_for(&self, surface: CreditSurface) -> InstallmentFormula {
        match surface {
            CreditSurface::WebTransaction => self.web_transaction,
            CreditSurface::MobileSimulation => self.mobile_simulation,
        }
    }
}

impl CreditConfig {
    /// rupiah, web on annuity, mobile on flat rate, standard plan table
    pub fn standard() -> Self {
        Self::default()
    }

    /// same formulas and plans for a currency with sub-units
    pub fn with_currency(code: &str, minor_units: u32) -> Self {
        Self {
            currency: CurrencyConfig {
                code: code.to_string(),
                minor_units,
            },
            ..Self::default()
        }
    }

    pub fn formula_for(&self, surface: CreditSurface) -> InstallmentFormula {
        self.surfaces.formula_for(surface)
    }

    /// load from json, missing sections fall back to the standard preset
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CreditConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency.code.trim().is_empty() {
            return Err(CreditError::InvalidConfiguration {
                message: "currency code must not be blank".to_string(),
            });
        }
        // rust_decimal keeps at most 28 fractional digits
        if self.currency.minor_units > 8 {
            return Err(CreditError::InvalidConfiguration {
                message: format!("minor units {} exceed 8", self.currency.minor_units),
            });
        }
        self.plans.validate()
    }
}
