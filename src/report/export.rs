use std::io::Write;

use super::engine::{
    CustomerSummary, InvoiceRow, MonthlySummary, OutstandingSummary, PaymentRow, ProductSummary,
};
use super::Report;
use crate::error::{BillingError, Result};

/// A report row with a fixed CSV column layout
pub trait CsvRow {
    const HEADER: &'static [&'static str];

    /// Cells in `HEADER` order
    fn record(&self) -> Vec<String>;
}

impl CsvRow for PaymentRow {
    const HEADER: &'static [&'static str] = &[
        "ID",
        "Invoice",
        "Customer",
        "Method",
        "Status",
        "Amount",
        "Payment Date",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.invoice_id.to_string(),
            self.customer_name.clone(),
            self.method.to_string(),
            self.status.to_string(),
            self.amount.to_string(),
            self.payment_date.to_string(),
        ]
    }
}

impl CsvRow for CustomerSummary {
    const HEADER: &'static [&'static str] = &["Customer", "No. of Payments", "Total Amount"];

    fn record(&self) -> Vec<String> {
        vec![
            self.customer_name.clone(),
            self.payment_count.to_string(),
            self.total_amount.to_string(),
        ]
    }
}

impl CsvRow for ProductSummary {
    const HEADER: &'static [&'static str] = &["Product", "Quantity", "Total Amount"];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.total_quantity.to_string(),
            self.total_amount.to_string(),
        ]
    }
}

impl CsvRow for InvoiceRow {
    const HEADER: &'static [&'static str] = &[
        "Invoice ID",
        "Customer",
        "Date",
        "Total Amount",
        "Paid Amount",
        "Balance",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.invoice_id.to_string(),
            self.customer_name.clone(),
            self.invoice_date.to_string(),
            self.total_amount.to_string(),
            self.paid_amount.to_string(),
            self.balance.to_string(),
        ]
    }
}

impl CsvRow for MonthlySummary {
    const HEADER: &'static [&'static str] = &[
        "Year",
        "Month",
        "No. of Invoices",
        "Total Invoice Amount",
        "Total Paid",
        "Total Balance",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.month.to_string(),
            self.invoice_count.to_string(),
            self.total_invoice_amount.to_string(),
            self.total_paid.to_string(),
            self.total_balance.to_string(),
        ]
    }
}

impl CsvRow for OutstandingSummary {
    const HEADER: &'static [&'static str] =
        &["Customer", "Total Invoice", "Total Paid", "Outstanding"];

    fn record(&self) -> Vec<String> {
        vec![
            self.customer_name.clone(),
            self.total_invoice_amount.to_string(),
            self.total_paid.to_string(),
            self.total_balance.to_string(),
        ]
    }
}

/// Write the header and every row, in order
pub fn write_rows<R: CsvRow, W: Write>(rows: &[R], out: W) -> Result<W> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(R::HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| {
        let err = e.error();
        BillingError::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}

pub fn write_report<W: Write>(report: &Report, out: W) -> Result<W> {
    match report {
        Report::Payments(rows) => write_rows(rows, out),
        Report::Customers(rows) => write_rows(rows, out),
        Report::Products(rows) => write_rows(rows, out),
        Report::Invoices(rows) => write_rows(rows, out),
        Report::Monthly(rows) => write_rows(rows, out),
        Report::Outstanding(rows) => write_rows(rows, out),
    }
}

/// The full CSV document as a string
pub fn to_csv(report: &Report) -> Result<String> {
    let bytes = write_report(report, Vec::new())?;
    String::from_utf8(bytes)
        .map_err(|e| BillingError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
