//! Read access to billing records.
//!
//! Report builders only ever see a [`RecordStore`]. Filtering by date range,
//! foreign key and status happens in the store, the way a database would
//! apply a `WHERE` clause; grouping and totals happen in the report engine.

mod records;

pub use records::{NewPayment, NewProduct, PaymentUpdate, Records};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::Result;
use crate::model::{zero_money, Customer, Invoice, InvoiceItem, Payment, PaymentStatus, Product};

/// A single filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Match<T> {
    /// No filter given
    #[default]
    Any,
    Only(T),
    /// A filter was given but can never match (unknown status, non-numeric id)
    Nothing,
}

impl<T: PartialEq> Match<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Match::Any => true,
            Match::Only(expected) => expected == value,
            Match::Nothing => false,
        }
    }
}

/// Conjunctive record filter. Each record kind applies the fields that concern it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub invoice_id: Match<u32>,
    pub customer_id: Match<u32>,
    pub status: Match<PaymentStatus>,
}

impl RecordQuery {
    /// Inclusive on both ends
    pub fn in_range(&self, date: NaiveDate) -> bool {
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}

/// Grouped `COUNT`/`SUM` of payments for one invoice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentTotal {
    pub count: usize,
    pub amount: Decimal,
}

impl Default for PaymentTotal {
    fn default() -> Self {
        Self {
            count: 0,
            amount: zero_money(),
        }
    }
}

pub trait RecordStore {
    fn customers(&self) -> Result<Vec<Customer>>;

    fn products(&self) -> Result<Vec<Product>>;

    /// Invoices matching `invoice_id`, `customer_id` and the invoice date range
    fn invoices(&self, query: &RecordQuery) -> Result<Vec<Invoice>>;

    /// Payments matching `invoice_id`, `status`, the payment date range and
    /// `customer_id` through the payment's invoice
    fn payments(&self, query: &RecordQuery) -> Result<Vec<Payment>>;

    /// Line items whose invoice matches `invoice_id`, `customer_id` and the invoice date range
    fn invoice_items(&self, query: &RecordQuery) -> Result<Vec<InvoiceItem>>;

    /// Payments with `status`, counted and summed per invoice
    fn payment_totals_by_invoice(
        &self,
        status: PaymentStatus,
    ) -> Result<HashMap<u32, PaymentTotal>> {
        let query = RecordQuery {
            status: Match::Only(status),
            ..RecordQuery::default()
        };
        let mut totals: HashMap<u32, PaymentTotal> = HashMap::new();
        for payment in self.payments(&query)? {
            let total = totals.entry(payment.invoice_id).or_default();
            total.count += 1;
            total.amount += payment.amount;
        }
        Ok(totals)
    }
}
