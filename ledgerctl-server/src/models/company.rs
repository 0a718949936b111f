//! Company input validation and list filtering

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use ledgerctl_core::CompanyType;

use super::validation::{optional_text, required, required_text};
use super::ValidationError;

const MAX_NAME_LEN: usize = 255;
const MAX_TEXT_LEN: usize = 1000;
const MAX_LINK_LEN: usize = 2048;

/// Loose shape check; delivery is the mail server's problem.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Create/update company request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    #[serde(rename = "type")]
    pub company_type: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub ledger_link: Option<String>,
    pub director: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

/// Validated company fields, ready to insert or update
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDraft {
    pub company_type: CompanyType,
    pub name: String,
    pub address: Option<String>,
    pub ledger_link: Option<String>,
    pub director: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl CompanyRequest {
    pub fn validate(self) -> Result<CompanyDraft, ValidationError> {
        let company_type = parse_company_type(required("type", self.company_type)?)?;
        let name = required_text("name", self.name, MAX_NAME_LEN)?;

        let email = optional_text("email", self.email, MAX_NAME_LEN)?;
        if let Some(email) = &email {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "must look like name@example.com",
                });
            }
        }

        Ok(CompanyDraft {
            company_type,
            name,
            address: optional_text("address", self.address, MAX_TEXT_LEN)?,
            ledger_link: optional_text("ledgerLink", self.ledger_link, MAX_LINK_LEN)?,
            director: optional_text("director", self.director, MAX_NAME_LEN)?,
            contact: optional_text("contact", self.contact, MAX_NAME_LEN)?,
            email,
        })
    }
}

fn parse_company_type(value: String) -> Result<CompanyType, ValidationError> {
    CompanyType::from_str(&value).map_err(|_| ValidationError::InvalidVariant {
        field: "type",
        value,
    })
}

/// Query parameters for the company list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyListParams {
    #[serde(rename = "type")]
    pub company_type: Option<String>,
    pub search: Option<String>,
}

/// Validated company list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub company_type: Option<CompanyType>,
    /// Case-insensitive substring of the company name
    pub search: Option<String>,
}

impl CompanyFilter {
    /// `ILIKE` pattern for `search`, with LIKE wildcards matched literally.
    pub fn name_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for ch in term.chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped.push('%');
            escaped
        })
    }
}

impl TryFrom<CompanyListParams> for CompanyFilter {
    type Error = ValidationError;

    fn try_from(params: CompanyListParams) -> Result<Self, Self::Error> {
        let company_type = match params.company_type {
            Some(t) if !t.trim().is_empty() && !t.eq_ignore_ascii_case("all") => {
                Some(parse_company_type(t)?)
            }
            _ => None,
        };

        Ok(Self {
            company_type,
            search: optional_text("search", params.search, MAX_NAME_LEN)?,
        })
    }
}
