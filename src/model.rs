use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BillingError, Result};

/// Decimal places carried by every monetary value
pub const MONEY_DP: u32 = 2;

/// Round to cents and pin the scale, so zero renders as `0.00`
pub fn money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Largest amount a money field holds (10 digits, 2 of them after the point)
pub const MAX_MONEY: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, MONEY_DP); // 9_999_999_999 x 10^-2

/// `0.00`
pub fn zero_money() -> Decimal {
    Decimal::new(0, MONEY_DP)
}

/// Parse user input such as "125.5" into a 2-dp amount
pub fn parse_money(input: &str) -> Result<Decimal> {
    Decimal::from_str(input.trim())
        .ok()
        .map(money)
        .filter(|amount| amount.abs() <= MAX_MONEY)
        .ok_or_else(|| BillingError::InvalidAmount(input.to_string()))
}

/// Parse a YYYY-MM-DD calendar date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| BillingError::InvalidDate(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub stock_qty: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl InvoiceStatus {
    /// Status implied by how much of `total` has been paid
    pub fn from_paid(total: Decimal, paid: Decimal) -> Self {
        if total > Decimal::ZERO && paid >= total {
            InvoiceStatus::Paid
        } else if paid > Decimal::ZERO {
            InvoiceStatus::PartiallyPaid
        } else {
            InvoiceStatus::Unpaid
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Unpaid => write!(f, "Unpaid"),
            InvoiceStatus::PartiallyPaid => write!(f, "Partially Paid"),
            InvoiceStatus::Paid => write!(f, "Paid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    pub id: u32,
    pub customer_id: u32,
    pub invoice_date: NaiveDate,
    #[serde(default = "zero_money")]
    pub tax_percent: Decimal,
    #[serde(default = "zero_money")]
    pub discount_amount: Decimal,
    #[serde(default = "zero_money")]
    pub subtotal: Decimal,
    #[serde(default = "zero_money")]
    pub tax_amount: Decimal,
    #[serde(default = "zero_money")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

/// Tax and total for a subtotal: `total = subtotal + tax - discount`
pub fn invoice_totals(
    subtotal: Decimal,
    tax_percent: Decimal,
    discount: Decimal,
) -> (Decimal, Decimal) {
    let tax_amount = money(subtotal * tax_percent / Decimal::ONE_HUNDRED);
    let total = money(subtotal + tax_amount - discount);
    (tax_amount, total)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InvoiceItem {
    pub id: u32,
    pub invoice_id: u32,
    pub product_id: u32,
    pub quantity: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Upi => write!(f, "UPI"),
            PaymentMethod::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(BillingError::InvalidMethod(s.to_string())),
        }
    }
}

/// Outcome of a payment attempt. Only `Success` counts toward an invoice's paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Success,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(BillingError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Payment {
    pub id: u32,
    pub invoice_id: u32,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_always_has_two_places() {
        assert_eq!(zero_money().to_string(), "0.00");
        assert_eq!(money(dec!(40)).to_string(), "40.00");
        assert_eq!(money(dec!(10.005)).to_string(), "10.01");
        assert_eq!(parse_money(" 12.5 ").unwrap().to_string(), "12.50");
        assert!(parse_money("twelve").is_err());
    }

    #[test]
    fn money_input_is_capped_at_ten_digits() {
        assert_eq!(parse_money("99999999.99").unwrap(), MAX_MONEY);
        assert!(matches!(
            parse_money("100000000"),
            Err(BillingError::InvalidAmount(_))
        ));
        assert!(parse_money("-100000000").is_err());
        assert!(parse_money("79228162514264337593543950335").is_err());
    }

    #[test]
    fn invoice_totals_apply_tax_then_discount() {
        let (tax, total) = invoice_totals(dec!(200.00), dec!(18), dec!(10.00));
        assert_eq!(tax, dec!(36.00));
        assert_eq!(total, dec!(226.00));
    }

    #[test]
    fn invoice_status_follows_paid_amount() {
        assert_eq!(
            InvoiceStatus::from_paid(dec!(100), dec!(0)),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            InvoiceStatus::from_paid(dec!(100), dec!(40)),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!(
            InvoiceStatus::from_paid(dec!(100), dec!(120)),
            InvoiceStatus::Paid
        );
        assert_eq!(InvoiceStatus::PartiallyPaid.to_string(), "Partially Paid");
    }

    #[test]
    fn payment_vocabulary_parses_case_insensitively() {
        assert_eq!("SUCCESS".parse::<PaymentStatus>().unwrap(), PaymentStatus::Success);
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("paid".parse::<PaymentStatus>().is_err());
        assert_eq!(PaymentMethod::Upi.to_string(), "UPI");
    }
}
