use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Data directory not found at {0}. Run 'billing init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write records: {0}")]
    RecordsWrite(#[from] toml::ser::Error),

    #[error("Data directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Customer {0} not found")]
    CustomerNotFound(u32),

    #[error("Product {0} not found")]
    ProductNotFound(u32),

    #[error("Invoice {0} not found")]
    InvoiceNotFound(u32),

    #[error("Payment {0} not found")]
    PaymentNotFound(u32),

    #[error("Customer {id} still has {invoices} invoice(s); remove them first")]
    CustomerInUse { id: u32, invoices: usize },

    #[error("Product SKU '{0}' is already in use")]
    DuplicateSku(String),

    #[error("Invalid item format '{0}'. Expected 'product:quantity' (e.g., '3:2')")]
    InvalidItemFormat(String),

    #[error("Invalid quantity '{qty}' for product '{product}': {reason}")]
    InvalidQuantity {
        product: String,
        qty: String,
        reason: String,
    },

    #[error("No items specified. Use --item <product>:<quantity> to add line items.")]
    NoItems,

    #[error("Invalid amount '{0}'. Expected a decimal number such as 125.50")]
    InvalidAmount(String),

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Unit price must not be negative")]
    NegativePrice,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown payment method '{0}'. Use cash, card, upi or other.")]
    InvalidMethod(String),

    #[error("Unknown payment status '{0}'. Use pending, success or failed.")]
    InvalidStatus(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
