pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod store;

pub use config::{Business, Config, ReportSettings};
pub use error::{BillingError, Result};
pub use model::{
    Customer, Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentMethod, PaymentStatus, Product,
};
pub use report::{FilterParams, Report, ReportKind};
pub use store::{RecordQuery, RecordStore, Records};
