use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tabled::Tabled;

use crate::error::Result;
use crate::model::{money, zero_money, Invoice, PaymentMethod, PaymentStatus};
use crate::store::{PaymentTotal, RecordQuery, RecordStore};

/// One payment, annotated with the customer it was billed to
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct PaymentRow {
    #[tabled(rename = "ID")]
    pub id: u32,
    #[tabled(rename = "Invoice")]
    pub invoice_id: u32,
    #[tabled(rename = "Customer")]
    pub customer_name: String,
    #[tabled(rename = "Method")]
    pub method: PaymentMethod,
    #[tabled(rename = "Status")]
    pub status: PaymentStatus,
    #[tabled(rename = "Amount")]
    pub amount: Decimal,
    #[tabled(rename = "Payment Date")]
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CustomerSummary {
    #[tabled(rename = "Customer")]
    pub customer_name: String,
    #[tabled(rename = "No. of Payments")]
    pub payment_count: usize,
    #[tabled(rename = "Total Amount")]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ProductSummary {
    #[tabled(rename = "Product")]
    pub product_name: String,
    #[tabled(rename = "Quantity")]
    pub total_quantity: u64,
    #[tabled(rename = "Total Amount")]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct InvoiceRow {
    #[tabled(rename = "Invoice ID")]
    pub invoice_id: u32,
    #[tabled(rename = "Customer")]
    pub customer_name: String,
    #[tabled(rename = "Date")]
    pub invoice_date: NaiveDate,
    #[tabled(rename = "Total Amount")]
    pub total_amount: Decimal,
    #[tabled(rename = "Paid Amount")]
    pub paid_amount: Decimal,
    #[tabled(rename = "Balance")]
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MonthlySummary {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Month")]
    pub month: u32,
    #[tabled(rename = "No. of Invoices")]
    pub invoice_count: usize,
    #[tabled(rename = "Total Invoice Amount")]
    pub total_invoice_amount: Decimal,
    #[tabled(rename = "Total Paid")]
    pub total_paid: Decimal,
    #[tabled(rename = "Total Balance")]
    pub total_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct OutstandingSummary {
    #[tabled(rename = "Customer")]
    pub customer_name: String,
    #[tabled(rename = "Total Invoice")]
    pub total_invoice_amount: Decimal,
    #[tabled(rename = "Total Paid")]
    pub total_paid: Decimal,
    #[tabled(rename = "Outstanding")]
    pub total_balance: Decimal,
}

/// Paid amount and balance of one invoice
#[derive(Debug, Clone, Copy, PartialEq)]
struct Settlement {
    paid: Decimal,
    balance: Decimal,
}

/// Successful payment totals keyed by invoice, looked up once per report
struct Ledger {
    paid: HashMap<u32, PaymentTotal>,
}

impl Ledger {
    fn load<S: RecordStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            paid: store.payment_totals_by_invoice(PaymentStatus::Success)?,
        })
    }

    fn settle(&self, invoice: &Invoice) -> Settlement {
        let paid = self
            .paid
            .get(&invoice.id)
            .map_or_else(zero_money, |t| money(t.amount));
        Settlement {
            paid,
            balance: money(invoice.total_amount - paid),
        }
    }
}

fn customer_names<S: RecordStore + ?Sized>(store: &S) -> Result<HashMap<u32, String>> {
    Ok(store
        .customers()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

fn name_of(names: &HashMap<u32, String>, id: u32) -> String {
    names.get(&id).cloned().unwrap_or_default()
}

/// Payments matching the filter, ordered by payment id
pub fn payment_rows<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<PaymentRow>> {
    let names = customer_names(store)?;
    let owners: HashMap<u32, u32> = store
        .invoices(&RecordQuery::default())?
        .into_iter()
        .map(|i| (i.id, i.customer_id))
        .collect();

    let mut rows: Vec<PaymentRow> = store
        .payments(query)?
        .into_iter()
        .map(|p| PaymentRow {
            id: p.id,
            invoice_id: p.invoice_id,
            customer_name: owners
                .get(&p.invoice_id)
                .map(|&customer| name_of(&names, customer))
                .unwrap_or_default(),
            method: p.method,
            status: p.status,
            amount: money(p.amount),
            payment_date: p.payment_date,
        })
        .collect();
    rows.sort_by_key(|r| r.id);

    tracing::debug!(rows = rows.len(), "built payment report");
    Ok(rows)
}

/// Payment count and amount per customer name, ordered by name
pub fn customer_summary<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<CustomerSummary>> {
    let mut groups: BTreeMap<String, CustomerSummary> = BTreeMap::new();

    for row in payment_rows(store, query)? {
        let group = groups
            .entry(row.customer_name.clone())
            .or_insert_with(|| CustomerSummary {
                customer_name: row.customer_name,
                payment_count: 0,
                total_amount: zero_money(),
            });
        group.payment_count += 1;
        group.total_amount += row.amount;
    }

    let rows: Vec<CustomerSummary> = groups.into_values().collect();
    tracing::debug!(rows = rows.len(), "built customer summary");
    Ok(rows)
}

/// Quantity and line amount per product name, ordered by name
pub fn product_summary<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<ProductSummary>> {
    let products: HashMap<u32, String> = store
        .products()?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let mut groups: BTreeMap<String, ProductSummary> = BTreeMap::new();

    for item in store.invoice_items(query)? {
        let name = name_of(&products, item.product_id);
        let group = groups
            .entry(name.clone())
            .or_insert_with(|| ProductSummary {
                product_name: name,
                total_quantity: 0,
                total_amount: zero_money(),
            });
        group.total_quantity += u64::from(item.quantity);
        group.total_amount += money(item.amount);
    }

    let rows: Vec<ProductSummary> = groups.into_values().collect();
    tracing::debug!(rows = rows.len(), "built product summary");
    Ok(rows)
}

/// Paid amount and balance for every matching invoice, ordered by invoice id
pub fn invoice_summary<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<InvoiceRow>> {
    let names = customer_names(store)?;
    let ledger = Ledger::load(store)?;

    let mut rows: Vec<InvoiceRow> = store
        .invoices(query)?
        .into_iter()
        .map(|invoice| {
            let settled = ledger.settle(&invoice);
            InvoiceRow {
                invoice_id: invoice.id,
                customer_name: name_of(&names, invoice.customer_id),
                invoice_date: invoice.invoice_date,
                total_amount: money(invoice.total_amount),
                paid_amount: settled.paid,
                balance: settled.balance,
            }
        })
        .collect();
    rows.sort_by_key(|r| r.invoice_id);

    tracing::debug!(rows = rows.len(), "built invoice summary");
    Ok(rows)
}

/// Invoice totals per calendar month, oldest first
pub fn monthly_summary<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<MonthlySummary>> {
    let ledger = Ledger::load(store)?;
    let mut months: BTreeMap<(i32, u32), MonthlySummary> = BTreeMap::new();

    for invoice in store.invoices(query)? {
        let year = invoice.invoice_date.year();
        let month = invoice.invoice_date.month();
        let settled = ledger.settle(&invoice);

        let row = months
            .entry((year, month))
            .or_insert_with(|| MonthlySummary {
                year,
                month,
                invoice_count: 0,
                total_invoice_amount: zero_money(),
                total_paid: zero_money(),
                total_balance: zero_money(),
            });
        row.invoice_count += 1;
        row.total_invoice_amount += money(invoice.total_amount);
        row.total_paid += settled.paid;
        row.total_balance += settled.balance;
    }

    let rows: Vec<MonthlySummary> = months.into_values().collect();
    tracing::debug!(rows = rows.len(), "built monthly summary");
    Ok(rows)
}

/// Unpaid balances per customer, largest first. Invoices with a balance
/// of zero or less are left out entirely.
pub fn outstanding_summary<S: RecordStore + ?Sized>(
    store: &S,
    query: &RecordQuery,
) -> Result<Vec<OutstandingSummary>> {
    let names = customer_names(store)?;
    let ledger = Ledger::load(store)?;
    let mut customers: HashMap<u32, OutstandingSummary> = HashMap::new();

    for invoice in store.invoices(query)? {
        let settled = ledger.settle(&invoice);
        if settled.balance <= Decimal::ZERO {
            continue;
        }

        let row = customers
            .entry(invoice.customer_id)
            .or_insert_with(|| OutstandingSummary {
                customer_name: name_of(&names, invoice.customer_id),
                total_invoice_amount: zero_money(),
                total_paid: zero_money(),
                total_balance: zero_money(),
            });
        row.total_invoice_amount += money(invoice.total_amount);
        row.total_paid += settled.paid;
        row.total_balance += settled.balance;
    }

    let mut rows: Vec<OutstandingSummary> = customers.into_values().collect();
    rows.sort_by(|a, b| {
        b.total_balance
            .cmp(&a.total_balance)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
    });

    tracing::debug!(rows = rows.len(), "built outstanding summary");
    Ok(rows)
}
