//! Proposal requests and the placeholders they fill.

use crate::template::{ReplacementMap, ToggleMap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fee overrides. Only the fields that are present fill a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PricingOverrides {
    #[serde(default)]
    pub setup_fee: Option<i64>,
    #[serde(default)]
    pub short_fee: Option<i64>,
    #[serde(default)]
    pub full_fee: Option<i64>,
    /// e.g. `"9%"`
    #[serde(default)]
    pub grant_fee: Option<String>,
    /// e.g. `"3%"`
    #[serde(default)]
    pub equity_fee: Option<String>,
}

/// A request for one company-specific proposal deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub company_name: String,

    // Accepted for compatibility, not used by the template
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub proposal_date: Option<NaiveDate>,
    #[serde(default)]
    pub slide_toggles: ToggleMap,
    #[serde(default)]
    pub pricing_overrides: PricingOverrides,
}

impl RenderRequest {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            contact_name: None,
            contact_email: None,
            program: None,
            proposal_date: None,
            slide_toggles: ToggleMap::default(),
            pricing_overrides: PricingOverrides::default(),
        }
    }

    /// `{{COMPANY_NAME}}` plus one placeholder per present pricing field.
    pub fn replacements(&self) -> ReplacementMap {
        let mut map = ReplacementMap::new();
        map.insert_placeholder("COMPANY_NAME", self.company_name.as_str());

        let po = &self.pricing_overrides;
        let fees = [
            ("SETUP_FEE", po.setup_fee.map(|v| v.to_string())),
            ("SHORT_FEE", po.short_fee.map(|v| v.to_string())),
            ("FULL_FEE", po.full_fee.map(|v| v.to_string())),
            ("GRANT_FEE", po.grant_fee.clone()),
            ("EQUITY_FEE", po.equity_fee.clone()),
        ];
        for (name, value) in fees {
            if let Some(value) = value {
                map.insert_placeholder(name, value);
            }
        }
        map
    }

    /// [`replacements`](Self::replacements) plus `{{DATE}}`, which is blank
    /// when no proposal date was given.
    pub fn replacements_with_date(&self) -> ReplacementMap {
        let mut map = self.replacements();
        map.insert_placeholder("DATE", self.formatted_date().unwrap_or_default());
        map
    }

    /// The proposal date as e.g. `March 05, 2025`.
    pub fn formatted_date(&self) -> Option<String> {
        self.proposal_date
            .map(|date| date.format("%B %d, %Y").to_string())
    }
}

/// Map every character that is not alphanumeric, space, `_` or `-` to `_`.
///
/// Alphanumeric includes non-ASCII letters and digits.
pub fn safe_filename_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
