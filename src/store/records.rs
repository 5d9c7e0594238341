use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Match, RecordQuery, RecordStore};
use crate::error::{BillingError, Result};
use crate::model::{
    invoice_totals, money, zero_money, Customer, Invoice, InvoiceItem, InvoiceStatus, Payment,
    PaymentMethod, PaymentStatus, Product, MAX_MONEY,
};

/// Every billing record, as persisted in records.toml
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Records {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub invoice_items: Vec<InvoiceItem>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub stock_qty: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: u32,
    /// Defaults to the invoice total
    pub amount: Option<Decimal>,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub notes: String,
}

/// Fields left as `None` keep their current value
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().unwrap_or(0) + 1
}

impl Records {
    pub fn customer(&self, id: u32) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn invoice(&self, id: u32) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Sum of successful payments against an invoice
    pub fn paid_amount(&self, invoice_id: u32) -> Decimal {
        let paid: Decimal = self
            .payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id && p.is_successful())
            .map(|p| p.amount)
            .sum();
        money(paid)
    }

    pub fn add_customer(
        &mut self,
        name: &str,
        email: Option<String>,
        phone: Option<String>,
    ) -> u32 {
        let id = next_id(self.customers.iter().map(|c| c.id));
        self.customers.push(Customer {
            id,
            name: name.to_string(),
            email,
            phone,
        });
        tracing::debug!(customer_id = id, "added customer");
        id
    }

    /// Customers referenced by an invoice cannot be removed
    pub fn remove_customer(&mut self, id: u32) -> Result<Customer> {
        let idx = self
            .customers
            .iter()
            .position(|c| c.id == id)
            .ok_or(BillingError::CustomerNotFound(id))?;

        let invoices = self.invoices.iter().filter(|i| i.customer_id == id).count();
        if invoices > 0 {
            return Err(BillingError::CustomerInUse { id, invoices });
        }

        Ok(self.customers.remove(idx))
    }

    pub fn add_product(&mut self, product: NewProduct) -> Result<u32> {
        if product.unit_price < Decimal::ZERO {
            return Err(BillingError::NegativePrice);
        }
        if self.products.iter().any(|p| p.sku == product.sku) {
            return Err(BillingError::DuplicateSku(product.sku));
        }

        let id = next_id(self.products.iter().map(|p| p.id));
        self.products.push(Product {
            id,
            name: product.name,
            sku: product.sku,
            unit_price: money(product.unit_price),
            stock_qty: product.stock_qty,
            is_active: product.is_active,
            created_at: Utc::now(),
        });
        tracing::debug!(product_id = id, "added product");
        Ok(id)
    }

    /// Create an invoice with one line per `(product_id, quantity)` pair,
    /// priced at each product's current unit price
    pub fn add_invoice(
        &mut self,
        customer_id: u32,
        invoice_date: NaiveDate,
        lines: &[(u32, u32)],
        tax_percent: Decimal,
        discount_amount: Decimal,
    ) -> Result<u32> {
        if self.customer(customer_id).is_none() {
            return Err(BillingError::CustomerNotFound(customer_id));
        }
        if lines.is_empty() {
            return Err(BillingError::NoItems);
        }

        let invoice_id = next_id(self.invoices.iter().map(|i| i.id));
        let mut item_id = next_id(self.invoice_items.iter().map(|i| i.id));
        let mut items = Vec::with_capacity(lines.len());
        let mut subtotal = zero_money();

        for &(product_id, quantity) in lines {
            let product = self
                .product(product_id)
                .ok_or(BillingError::ProductNotFound(product_id))?;
            let amount = product
                .unit_price
                .checked_mul(Decimal::from(quantity))
                .map(money)
                .filter(|a| *a <= MAX_MONEY)
                .ok_or_else(|| {
                    BillingError::InvalidAmount(format!("{} x {quantity}", product.unit_price))
                })?;
            subtotal = subtotal
                .checked_add(amount)
                .filter(|s| *s <= MAX_MONEY)
                .ok_or_else(|| BillingError::InvalidAmount(subtotal.to_string()))?;
            items.push(InvoiceItem {
                id: item_id,
                invoice_id,
                product_id,
                quantity,
                amount,
            });
            item_id += 1;
        }

        let discount_amount = money(discount_amount);
        let (tax_amount, total_amount) = invoice_totals(subtotal, tax_percent, discount_amount);

        self.invoices.push(Invoice {
            id: invoice_id,
            customer_id,
            invoice_date,
            tax_percent: money(tax_percent),
            discount_amount,
            subtotal: money(subtotal),
            tax_amount,
            total_amount,
            status: InvoiceStatus::Unpaid,
            created_at: Utc::now(),
        });
        self.invoice_items.extend(items);

        tracing::debug!(invoice_id, %total_amount, "added invoice");
        Ok(invoice_id)
    }

    /// Remove an invoice together with its line items and payments
    pub fn remove_invoice(&mut self, id: u32) -> Result<Invoice> {
        let idx = self
            .invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or(BillingError::InvoiceNotFound(id))?;

        self.invoice_items.retain(|item| item.invoice_id != id);
        self.payments.retain(|p| p.invoice_id != id);
        Ok(self.invoices.remove(idx))
    }

    pub fn add_payment(&mut self, payment: NewPayment) -> Result<u32> {
        let invoice = self
            .invoice(payment.invoice_id)
            .ok_or(BillingError::InvoiceNotFound(payment.invoice_id))?;

        let amount = money(payment.amount.unwrap_or(invoice.total_amount));
        if amount <= Decimal::ZERO {
            return Err(BillingError::InvalidPaymentAmount);
        }

        let id = next_id(self.payments.iter().map(|p| p.id));
        self.payments.push(Payment {
            id,
            invoice_id: payment.invoice_id,
            amount,
            payment_date: payment.payment_date,
            method: payment.method,
            status: payment.status,
            notes: payment.notes,
            created_at: Utc::now(),
        });
        self.refresh_invoice_status(payment.invoice_id);

        tracing::debug!(payment_id = id, invoice_id = payment.invoice_id, %amount, "added payment");
        Ok(id)
    }

    pub fn update_payment(&mut self, id: u32, update: PaymentUpdate) -> Result<&Payment> {
        let amount = update.amount.map(money);
        if amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(BillingError::InvalidPaymentAmount);
        }

        let idx = self
            .payments
            .iter()
            .position(|p| p.id == id)
            .ok_or(BillingError::PaymentNotFound(id))?;

        let payment = &mut self.payments[idx];
        if let Some(amount) = amount {
            payment.amount = amount;
        }
        if let Some(date) = update.payment_date {
            payment.payment_date = date;
        }
        if let Some(method) = update.method {
            payment.method = method;
        }
        if let Some(status) = update.status {
            payment.status = status;
        }
        if let Some(notes) = update.notes {
            payment.notes = notes;
        }
        let invoice_id = payment.invoice_id;

        self.refresh_invoice_status(invoice_id);
        Ok(&self.payments[idx])
    }

    pub fn remove_payment(&mut self, id: u32) -> Result<Payment> {
        let idx = self
            .payments
            .iter()
            .position(|p| p.id == id)
            .ok_or(BillingError::PaymentNotFound(id))?;

        let removed = self.payments.remove(idx);
        self.refresh_invoice_status(removed.invoice_id);
        Ok(removed)
    }

    fn refresh_invoice_status(&mut self, invoice_id: u32) {
        let paid = self.paid_amount(invoice_id);
        if let Some(invoice) = self.invoices.iter_mut().find(|i| i.id == invoice_id) {
            invoice.status = InvoiceStatus::from_paid(invoice.total_amount, paid);
        }
    }

    fn invoice_matches(&self, invoice: &Invoice, query: &RecordQuery) -> bool {
        query.invoice_id.accepts(&invoice.id)
            && query.customer_id.accepts(&invoice.customer_id)
            && query.in_range(invoice.invoice_date)
    }
}

impl RecordStore for Records {
    fn customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.clone())
    }

    fn products(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    fn invoices(&self, query: &RecordQuery) -> Result<Vec<Invoice>> {
        Ok(self
            .invoices
            .iter()
            .filter(|i| self.invoice_matches(i, query))
            .cloned()
            .collect())
    }

    fn payments(&self, query: &RecordQuery) -> Result<Vec<Payment>> {
        let customer_ok = |p: &Payment| match query.customer_id {
            Match::Any => true,
            _ => self
                .invoice(p.invoice_id)
                .is_some_and(|i| query.customer_id.accepts(&i.customer_id)),
        };

        Ok(self
            .payments
            .iter()
            .filter(|p| query.invoice_id.accepts(&p.invoice_id))
            .filter(|p| query.status.accepts(&p.status))
            .filter(|p| query.in_range(p.payment_date))
            .filter(|p| customer_ok(*p))
            .cloned()
            .collect())
    }

    fn invoice_items(&self, query: &RecordQuery) -> Result<Vec<InvoiceItem>> {
        Ok(self
            .invoice_items
            .iter()
            .filter(|item| {
                self.invoice(item.invoice_id)
                    .is_some_and(|i| self.invoice_matches(i, query))
            })
            .cloned()
            .collect())
    }
}
