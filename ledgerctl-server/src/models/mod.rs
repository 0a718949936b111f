//! Request models with validation at construction
//!
//! Handlers deserialize loose request bodies (every field optional) and turn
//! them into validated drafts. Invalid input returns ValidationError, not panic.

pub mod company;
pub mod entry;
pub mod validation;

pub use company::{CompanyDraft, CompanyFilter, CompanyListParams, CompanyRequest};
pub use entry::{
    ChargeDraft, ChargeEdit, ChargeRequest, NewPackageRequest, PackageDraft, PackageUpdate,
    PackageUpdateRequest, PaymentDraft, PaymentRequest,
};
pub use validation::ValidationError;
