//! Financial reports over billing records.
//!
//! Six report kinds share one filter set. Each kind can be viewed (rows) or
//! exported as CSV with a fixed header; both come from the same [`Report`],
//! so a view and its export always hold the same rows in the same order.

mod engine;
mod export;
mod filter;

pub use engine::{
    customer_summary, invoice_summary, monthly_summary, outstanding_summary, payment_rows,
    product_summary, CustomerSummary, InvoiceRow, MonthlySummary, OutstandingSummary, PaymentRow,
    ProductSummary,
};
pub use export::{to_csv, write_report, write_rows, CsvRow};
pub use filter::FilterParams;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::store::{RecordQuery, RecordStore};

/// MIME type of every export
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Payments,
    Customers,
    Products,
    Invoices,
    Monthly,
    Outstanding,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::Payments,
        ReportKind::Customers,
        ReportKind::Products,
        ReportKind::Invoices,
        ReportKind::Monthly,
        ReportKind::Outstanding,
    ];

    /// Download file name for the CSV export
    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Payments => "payments_report.csv",
            ReportKind::Customers => "customer_report.csv",
            ReportKind::Products => "product_report.csv",
            ReportKind::Invoices => "invoice_report.csv",
            ReportKind::Monthly => "monthly_report.csv",
            ReportKind::Outstanding => "outstanding_report.csv",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Payments => "Payments Report",
            ReportKind::Customers => "Customer-wise Report",
            ReportKind::Products => "Product-wise Report",
            ReportKind::Invoices => "Invoice-wise Report",
            ReportKind::Monthly => "Monthly Summary",
            ReportKind::Outstanding => "Outstanding Report",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            ReportKind::Payments => PaymentRow::HEADER,
            ReportKind::Customers => CustomerSummary::HEADER,
            ReportKind::Products => ProductSummary::HEADER,
            ReportKind::Invoices => InvoiceRow::HEADER,
            ReportKind::Monthly => MonthlySummary::HEADER,
            ReportKind::Outstanding => OutstandingSummary::HEADER,
        }
    }

    /// `Content-Disposition` value for serving the export over HTTP
    pub fn content_disposition(self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name())
    }
}

/// The rows of one report, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Payments(Vec<PaymentRow>),
    Customers(Vec<CustomerSummary>),
    Products(Vec<ProductSummary>),
    Invoices(Vec<InvoiceRow>),
    Monthly(Vec<MonthlySummary>),
    Outstanding(Vec<OutstandingSummary>),
}

impl Report {
    pub fn build<S: RecordStore + ?Sized>(
        store: &S,
        kind: ReportKind,
        filters: &FilterParams,
    ) -> Result<Self> {
        let query = filters.to_query();
        Self::build_with_query(store, kind, &query)
    }

    pub fn build_with_query<S: RecordStore + ?Sized>(
        store: &S,
        kind: ReportKind,
        query: &RecordQuery,
    ) -> Result<Self> {
        Ok(match kind {
            ReportKind::Payments => Report::Payments(payment_rows(store, query)?),
            ReportKind::Customers => Report::Customers(customer_summary(store, query)?),
            ReportKind::Products => Report::Products(product_summary(store, query)?),
            ReportKind::Invoices => Report::Invoices(invoice_summary(store, query)?),
            ReportKind::Monthly => Report::Monthly(monthly_summary(store, query)?),
            ReportKind::Outstanding => Report::Outstanding(outstanding_summary(store, query)?),
        })
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Payments(_) => ReportKind::Payments,
            Report::Customers(_) => ReportKind::Customers,
            Report::Products(_) => ReportKind::Products,
            Report::Invoices(_) => ReportKind::Invoices,
            Report::Monthly(_) => ReportKind::Monthly,
            Report::Outstanding(_) => ReportKind::Outstanding,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Report::Payments(rows) => rows.len(),
            Report::Customers(rows) => rows.len(),
            Report::Products(rows) => rows.len(),
            Report::Invoices(rows) => rows.len(),
            Report::Monthly(rows) => rows.len(),
            Report::Outstanding(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
