//! Route handlers organized by resource

pub mod charges;
pub mod companies;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod packages;
pub mod payments;
