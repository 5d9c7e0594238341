use chrono::NaiveDate;

use crate::model::{parse_date, PaymentStatus};
use crate::store::{Match, RecordQuery};

/// Report filters as they arrive from the outside, all optional strings.
///
/// Filters never fail: a malformed date is dropped, and an unknown status or
/// non-numeric id turns into a filter that matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub invoice_id: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl FilterParams {
    pub fn to_query(&self) -> RecordQuery {
        RecordQuery {
            date_from: date_bound("date_from", &self.date_from),
            date_to: date_bound("date_to", &self.date_to),
            invoice_id: id_match(&self.invoice_id),
            customer_id: id_match(&self.customer_id),
            status: status_match(&self.status),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn id_match(value: &Option<String>) -> Match<u32> {
    match present(value) {
        None => Match::Any,
        Some(s) => s.parse().map(Match::Only).unwrap_or(Match::Nothing),
    }
}

fn status_match(value: &Option<String>) -> Match<PaymentStatus> {
    match present(value) {
        None => Match::Any,
        Some(s) => s.parse().map(Match::Only).unwrap_or(Match::Nothing),
    }
}

fn date_bound(name: &str, value: &Option<String>) -> Option<NaiveDate> {
    let raw = present(value)?;
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(filter = name, value = raw, "ignoring malformed date filter");
            None
        }
    }
}
