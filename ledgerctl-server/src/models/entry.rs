//! Package, charge and payment input validation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::validation::{optional_text, required, required_text};
use super::ValidationError;

const MAX_DESCRIPTION_LEN: usize = 1000;

/// Create package request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPackageRequest {
    pub company_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Validated package fields
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDraft {
    pub date: NaiveDate,
    pub description: String,
}

impl NewPackageRequest {
    /// Returns the owning company id and the package fields.
    pub fn validate(self) -> Result<(Uuid, PackageDraft), ValidationError> {
        let company_id = required("companyId", self.company_id)?;
        let draft = PackageDraft {
            date: required("date", self.date)?,
            description: required_text("description", self.description, MAX_DESCRIPTION_LEN)?,
        };
        Ok((company_id, draft))
    }
}

/// Update package request body.
///
/// `charges` edits ride along with the package update: entries with an `id`
/// update that charge, entries without one are inserted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageUpdateRequest {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default)]
    pub charges: Vec<ChargeEditRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeEditRequest {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub charge: ChargeRequest,
}

/// Validated package update
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUpdate {
    pub package: PackageDraft,
    pub charges: Vec<ChargeEdit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeEdit {
    /// `None` inserts a new charge
    pub id: Option<Uuid>,
    pub charge: ChargeDraft,
}

impl PackageUpdateRequest {
    pub fn validate(self) -> Result<PackageUpdate, ValidationError> {
        let package = PackageDraft {
            date: required("date", self.date)?,
            description: required_text("description", self.description, MAX_DESCRIPTION_LEN)?,
        };

        let charges = self
            .charges
            .into_iter()
            .map(|edit| {
                Ok(ChargeEdit {
                    id: edit.id,
                    charge: edit.charge.validate()?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(PackageUpdate { package, charges })
    }
}

/// Create/update charge request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Validated charge. Amount is signed; negative is a discount.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDraft {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl ChargeRequest {
    pub fn validate(self) -> Result<ChargeDraft, ValidationError> {
        Ok(ChargeDraft {
            description: required_text("description", self.description, MAX_DESCRIPTION_LEN)?,
            amount: money("amount", required("amount", self.amount)?)?,
            date: required("date", self.date)?,
        })
    }
}

/// Create/update payment request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Only read on create; payments never move between packages
    pub package_id: Option<Uuid>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Validated payment. Amount is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl PaymentRequest {
    pub fn validate(self) -> Result<PaymentDraft, ValidationError> {
        let amount = money("amount", required("amount", self.amount)?)?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive { field: "amount" });
        }

        Ok(PaymentDraft {
            description: optional_text("description", self.description, MAX_DESCRIPTION_LEN)?,
            amount,
            date: required("date", self.date)?,
        })
    }

    /// Validate for creation, which also needs the target package.
    pub fn validate_new(mut self) -> Result<(Uuid, PaymentDraft), ValidationError> {
        let package_id = required("packageId", self.package_id.take())?;
        Ok((package_id, self.validate()?))
    }
}

/// Exclusive bound of a NUMERIC(14, 2) column: twelve integer digits.
const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Round to cents and check the result fits the NUMERIC(14, 2) columns.
fn money(field: &'static str, amount: Decimal) -> Result<Decimal, ValidationError> {
    let amount = amount.round_dp(2);
    if amount.abs() >= MAX_MONEY {
        return Err(ValidationError::OutOfRange { field });
    }
    Ok(amount)
}
