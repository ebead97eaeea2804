use crate::error::OperationsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Cancelled,
}

impl QuoteStatus {
    #[must_use]
    pub const fn is_versionable(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl LineItem {
    /// `quantity × unit_price_cents`.
    ///
    /// # Errors
    ///
    /// [`OperationsError::Overflow`] when the product does not fit in `i64`.
    pub fn total(&self) -> Result<i64, OperationsError> {
        self.unit_price_cents.checked_mul(i64::from(self.quantity)).ok_or_else(|| {
            OperationsError::Overflow {
                message: format!("{} × {}", self.quantity, self.unit_price_cents).into(),
                context: Some(self.description.clone().into()),
            }
        })
    }
}

/// A rental quote. Versions of one quote share `number` and point at the first
/// version through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub number: String,
    pub version: u32,
    pub parent_id: Option<String>,
    pub customer: String,
    pub vehicle_class: String,
    pub line_items: Vec<LineItem>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Id of the first version in this quote's chain.
    #[must_use]
    pub fn root_id(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(&self.id)
    }

    /// Copies this quote into a fresh draft one version up.
    ///
    /// # Errors
    ///
    /// - [`OperationsError::NotVersionable`] for cancelled quotes.
    /// - [`OperationsError::Overflow`] when the version counter is exhausted.
    pub fn new_version(
        &self,
        new_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, OperationsError> {
        if !self.status.is_versionable() {
            return Err(OperationsError::NotVersionable {
                message: format!("quote {} is {:?}", self.number, self.status).into(),
                context: None,
            });
        }
        let version = self.version.checked_add(1).ok_or_else(|| OperationsError::Overflow {
            message: "version counter exhausted".into(),
            context: Some(self.number.clone().into()),
        })?;

        let next = Self {
            id: new_id.into(),
            number: self.number.clone(),
            version,
            parent_id: Some(self.root_id().to_owned()),
            customer: self.customer.clone(),
            vehicle_class: self.vehicle_class.clone(),
            line_items: self.line_items.clone(),
            status: QuoteStatus::Draft,
            created_at: now,
        };
        debug!(number = %next.number, version, parent = ?next.parent_id, "Quote versioned");
        Ok(next)
    }

    /// Sum of all line totals in cents.
    ///
    /// # Errors
    ///
    /// [`OperationsError::Overflow`] when a line or the sum overflows.
    pub fn total(&self) -> Result<i64, OperationsError> {
        self.line_items.iter().try_fold(0_i64, |sum, item| {
            sum.checked_add(item.total()?).ok_or_else(|| OperationsError::Overflow {
                message: "quote total".into(),
                context: Some(self.number.clone().into()),
            })
        })
    }
}

/// Highest version among `quotes` carrying `number`.
#[must_use]
pub fn latest_version<'a>(quotes: &'a [Quote], number: &str) -> Option<&'a Quote> {
    quotes.iter().filter(|quote| quote.number == number).max_by_key(|quote| quote.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, unit_price_cents: i64) -> LineItem {
        LineItem { description: "Compact SUV, weekly".into(), quantity, unit_price_cents }
    }

    #[test]
    fn line_total_overflow_is_reported() {
        assert_eq!(item(3, 12_500).total().unwrap(), 37_500);
        assert_eq!(item(2, i64::MAX).total().unwrap_err().kind(), "Overflow");
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&QuoteStatus::Cancelled).unwrap(), "\"cancelled\"");
    }
}
