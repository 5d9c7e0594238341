use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use billing::config::{
    config_dir, load_config, load_records, resolve_output_dir, save_records, CONFIG_TEMPLATE,
    RECORDS_TEMPLATE,
};
use billing::error::{BillingError, Result};
use billing::model::{parse_date, parse_money, zero_money, PaymentMethod, PaymentStatus};
use billing::report::{write_report, FilterParams, Report, ReportKind};
use billing::store::{NewPayment, NewProduct, PaymentUpdate};

#[derive(Parser)]
#[command(name = "billing")]
#[command(
    version,
    about = "Minimal CLI billing records and financial reports",
    long_about = None
)]
struct Cli {
    /// Path to data directory (default: ~/.billing or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data directory with template files
    Init,

    /// Show data directory and record counts
    Status,

    /// List customers
    Customers,

    /// Add a customer
    AddCustomer {
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Remove a customer that has no invoices
    RemoveCustomer { id: u32 },

    /// List products
    Products,

    /// Add a product
    AddProduct {
        name: String,

        /// Unique stock keeping unit
        #[arg(long)]
        sku: String,

        /// Unit price (e.g., 25.00)
        #[arg(long)]
        price: String,

        #[arg(long, default_value_t = 0)]
        stock: u32,

        /// Mark the product inactive
        #[arg(long)]
        inactive: bool,
    },

    /// List invoices with paid amount and status
    Invoices,

    /// Create an invoice
    AddInvoice {
        /// Customer id
        #[arg(short, long)]
        customer: u32,

        /// Line items in format "product:quantity" (can be repeated)
        #[arg(short, long, value_name = "PRODUCT:QTY")]
        item: Vec<String>,

        /// Invoice date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Tax percent applied to the subtotal (e.g., 18)
        #[arg(long)]
        tax_percent: Option<String>,

        /// Discount amount subtracted from the total
        #[arg(long)]
        discount: Option<String>,
    },

    /// Remove an invoice with its items and payments
    RemoveInvoice { id: u32 },

    /// List payments, newest first
    Payments,

    /// Record a payment against an invoice
    AddPayment {
        /// Invoice id
        #[arg(short, long)]
        invoice: u32,

        /// Payment amount (default: invoice total)
        #[arg(long)]
        amount: Option<String>,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// cash, card, upi or other (default: cash)
        #[arg(long)]
        method: Option<String>,

        /// pending, success or failed (default: success)
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Change fields of a recorded payment
    EditPayment {
        id: u32,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        method: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a payment
    RemovePayment { id: u32 },

    /// Show a financial report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export a financial report as CSV
    Export {
        #[arg(value_enum)]
        kind: ReportKind,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file, or '-' for stdout (default: output_dir/<report>_report.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Report filters. Malformed values never fail; they just match nothing or are ignored.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Only rows for this invoice id
    #[arg(long)]
    invoice_id: Option<String>,

    /// Payment status (pending, success, failed)
    #[arg(long)]
    status: Option<String>,

    /// Only rows for this customer id
    #[arg(long)]
    customer_id: Option<String>,

    /// From date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// To date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            invoice_id: args.invoice_id,
            status: args.status,
            customer_id: args.customer_id,
            date_from: args.from,
            date_to: args.to,
        }
    }
}

fn main() {
    billing::logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Customers => cmd_customers(&cfg_dir),
        Commands::AddCustomer { name, email, phone } => {
            cmd_add_customer(&cfg_dir, &name, email, phone)
        }
        Commands::RemoveCustomer { id } => cmd_remove_customer(&cfg_dir, id),
        Commands::Products => cmd_products(&cfg_dir),
        Commands::AddProduct {
            name,
            sku,
            price,
            stock,
            inactive,
        } => cmd_add_product(&cfg_dir, name, sku, &price, stock, !inactive),
        Commands::Invoices => cmd_invoices(&cfg_dir),
        Commands::AddInvoice {
            customer,
            item,
            date,
            tax_percent,
            discount,
        } => cmd_add_invoice(&cfg_dir, customer, &item, date, tax_percent, discount),
        Commands::RemoveInvoice { id } => cmd_remove_invoice(&cfg_dir, id),
        Commands::Payments => cmd_payments(&cfg_dir),
        Commands::AddPayment {
            invoice,
            amount,
            date,
            method,
            status,
            notes,
        } => cmd_add_payment(&cfg_dir, invoice, amount, date, method, status, notes),
        Commands::EditPayment {
            id,
            amount,
            date,
            method,
            status,
            notes,
        } => cmd_edit_payment(&cfg_dir, id, amount, date, method, status, notes),
        Commands::RemovePayment { id } => cmd_remove_payment(&cfg_dir, id),
        Commands::Report {
            kind,
            filters,
            json,
        } => cmd_report(&cfg_dir, kind, filters.into(), json),
        Commands::Export {
            kind,
            filters,
            output,
        } => cmd_export(&cfg_dir, kind, filters.into(), output),
    }
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Initialize data directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(BillingError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("records.toml"), RECORDS_TEMPLATE)?;

    println!("Initialized billing data at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your business details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Add a customer:              billing add-customer \"Acme Corp\"");
    println!("  3. Add a product:               billing add-product Widget --sku W-1 --price 25.00");
    println!();
    println!("Then create your first invoice:");
    println!("  billing add-invoice --customer <id> --item <product>:<quantity>");

    Ok(())
}

fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    println!("Billing Status");
    println!("{}", "-".repeat(50));
    println!("Data directory:   {}", cfg_dir.display());
    println!("Business:         {}", config.business.name);
    println!("Customers:        {}", records.customers.len());
    println!("Products:         {}", records.products.len());
    println!("Invoices:         {}", records.invoices.len());
    println!("Payments:         {}", records.payments.len());

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "PHONE")]
    phone: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "STOCK")]
    stock: u32,
    #[tabled(rename = "ACTIVE")]
    active: String,
}

#[derive(Tabled)]
struct InvoiceListRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct PaymentListRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "INVOICE")]
    invoice: u32,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn cmd_customers(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    if records.customers.is_empty() {
        println!("No customers yet.");
        println!("Add one with: billing add-customer <name>");
        return Ok(());
    }

    let rows: Vec<CustomerRow> = records
        .customers
        .iter()
        .map(|c| CustomerRow {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone().unwrap_or_default(),
            phone: c.phone.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn cmd_add_customer(
    cfg_dir: &Path,
    name: &str,
    email: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let id = records.add_customer(name, email, phone);
    save_records(cfg_dir, &records)?;

    println!("Added customer {id}: {name}");
    Ok(())
}

fn cmd_remove_customer(cfg_dir: &Path, id: u32) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let removed = records.remove_customer(id)?;
    save_records(cfg_dir, &records)?;

    println!("Removed customer {}: {}", removed.id, removed.name);
    Ok(())
}

fn cmd_products(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    if records.products.is_empty() {
        println!("No products yet.");
        println!("Add one with: billing add-product <name> --sku <sku> --price <price>");
        return Ok(());
    }

    let rows: Vec<ProductRow> = records
        .products
        .iter()
        .map(|p| ProductRow {
            id: p.id,
            name: p.name.clone(),
            sku: p.sku.clone(),
            price: format!("{}{}", config.report.currency_symbol, p.unit_price),
            stock: p.stock_qty,
            active: if p.is_active { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn cmd_add_product(
    cfg_dir: &Path,
    name: String,
    sku: String,
    price: &str,
    stock_qty: u32,
    is_active: bool,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let id = records.add_product(NewProduct {
        name: name.clone(),
        sku: sku.clone(),
        unit_price: parse_money(price)?,
        stock_qty,
        is_active,
    })?;
    save_records(cfg_dir, &records)?;

    println!("Added product {id}: {name} ({sku})");
    Ok(())
}

fn cmd_invoices(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    if records.invoices.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    let symbol = &config.report.currency_symbol;
    let rows: Vec<InvoiceListRow> = records
        .invoices
        .iter()
        .map(|inv| InvoiceListRow {
            id: inv.id,
            date: inv.invoice_date.to_string(),
            customer: records
                .customer(inv.customer_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            total: format!("{symbol}{}", inv.total_amount),
            paid: format!("{symbol}{}", records.paid_amount(inv.id)),
            status: inv.status.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} invoices", records.invoices.len());

    Ok(())
}

/// Parse item input like "3:2" into (product_id, quantity)
fn parse_item_input(input: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 {
        return Err(BillingError::InvalidItemFormat(input.to_string()));
    }

    let product_id: u32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| BillingError::InvalidItemFormat(input.to_string()))?;
    let qty_str = parts[1];

    let quantity: u32 = qty_str
        .trim()
        .parse()
        .map_err(|_| BillingError::InvalidQuantity {
            product: parts[0].to_string(),
            qty: qty_str.to_string(),
            reason: "must be a whole number".to_string(),
        })?;

    if quantity == 0 {
        return Err(BillingError::InvalidQuantity {
            product: parts[0].to_string(),
            qty: qty_str.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok((product_id, quantity))
}

fn date_or_today(input: Option<String>) -> Result<chrono::NaiveDate> {
    match input {
        Some(s) => parse_date(&s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn cmd_add_invoice(
    cfg_dir: &Path,
    customer_id: u32,
    items_input: &[String],
    date: Option<String>,
    tax_percent: Option<String>,
    discount: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    if items_input.is_empty() {
        return Err(BillingError::NoItems);
    }

    let lines = items_input
        .iter()
        .map(|input| parse_item_input(input))
        .collect::<Result<Vec<_>>>()?;
    let invoice_date = date_or_today(date)?;
    let tax_percent = tax_percent.as_deref().map(parse_money).transpose()?;
    let discount = discount.as_deref().map(parse_money).transpose()?;

    let config = load_config(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let id = records.add_invoice(
        customer_id,
        invoice_date,
        &lines,
        tax_percent.unwrap_or_else(zero_money),
        discount.unwrap_or_else(zero_money),
    )?;
    save_records(cfg_dir, &records)?;

    if let Some(invoice) = records.invoice(id) {
        println!("Created invoice {id}");
        println!("  Date:     {}", invoice.invoice_date);
        println!(
            "  Subtotal: {}{}",
            config.report.currency_symbol, invoice.subtotal
        );
        println!(
            "  Total:    {}{}",
            config.report.currency_symbol, invoice.total_amount
        );
    }

    Ok(())
}

fn cmd_remove_invoice(cfg_dir: &Path, id: u32) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let removed = records.remove_invoice(id)?;
    save_records(cfg_dir, &records)?;

    println!("Removed invoice {} with its items and payments", removed.id);
    Ok(())
}

fn cmd_payments(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    if records.payments.is_empty() {
        println!("No payments recorded.");
        return Ok(());
    }

    let mut payments: Vec<_> = records.payments.iter().collect();
    payments.sort_by(|a, b| b.id.cmp(&a.id));

    let rows: Vec<PaymentListRow> = payments
        .into_iter()
        .map(|p| PaymentListRow {
            id: p.id,
            invoice: p.invoice_id,
            customer: records
                .invoice(p.invoice_id)
                .and_then(|inv| records.customer(inv.customer_id))
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            date: p.payment_date.to_string(),
            amount: format!("{}{}", config.report.currency_symbol, p.amount),
            method: p.method.to_string(),
            status: p.status.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn cmd_add_payment(
    cfg_dir: &Path,
    invoice_id: u32,
    amount: Option<String>,
    date: Option<String>,
    method: Option<String>,
    status: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let payment = NewPayment {
        invoice_id,
        amount: amount.as_deref().map(parse_money).transpose()?,
        payment_date: date_or_today(date)?,
        method: method
            .as_deref()
            .map(str::parse::<PaymentMethod>)
            .transpose()?
            .unwrap_or_default(),
        status: status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?
            .unwrap_or_default(),
        notes: notes.unwrap_or_default(),
    };

    let config = load_config(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let id = records.add_payment(payment)?;
    save_records(cfg_dir, &records)?;

    let symbol = &config.report.currency_symbol;
    if let (Some(p), Some(inv)) = (
        records.payments.iter().find(|p| p.id == id),
        records.invoice(invoice_id),
    ) {
        println!(
            "Recorded payment {id}: {symbol}{} for invoice {invoice_id} (invoice now {})",
            p.amount, inv.status
        );
    }

    Ok(())
}

fn cmd_edit_payment(
    cfg_dir: &Path,
    id: u32,
    amount: Option<String>,
    date: Option<String>,
    method: Option<String>,
    status: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let update = PaymentUpdate {
        amount: amount.as_deref().map(parse_money).transpose()?,
        payment_date: date.as_deref().map(parse_date).transpose()?,
        method: method.as_deref().map(str::parse::<PaymentMethod>).transpose()?,
        status: status.as_deref().map(str::parse::<PaymentStatus>).transpose()?,
        notes,
    };

    let mut records = load_records(cfg_dir)?;
    let updated = records.update_payment(id, update)?;
    let summary = format!(
        "Updated payment {}: {} on {} ({}, {})",
        updated.id, updated.amount, updated.payment_date, updated.method, updated.status
    );
    save_records(cfg_dir, &records)?;

    println!("{summary}");
    Ok(())
}

fn cmd_remove_payment(cfg_dir: &Path, id: u32) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let mut records = load_records(cfg_dir)?;

    let removed = records.remove_payment(id)?;
    save_records(cfg_dir, &records)?;

    println!(
        "Removed {}{} payment from invoice {}",
        config.report.currency_symbol, removed.amount, removed.invoice_id
    );
    Ok(())
}

fn render_table(report: &Report) -> String {
    let mut table = match report {
        Report::Payments(rows) => Table::new(rows),
        Report::Customers(rows) => Table::new(rows),
        Report::Products(rows) => Table::new(rows),
        Report::Invoices(rows) => Table::new(rows),
        Report::Monthly(rows) => Table::new(rows),
        Report::Outstanding(rows) => Table::new(rows),
    };
    table.with(Style::rounded()).to_string()
}

fn cmd_report(cfg_dir: &Path, kind: ReportKind, filters: FilterParams, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    let report = Report::build(&records, kind, &filters)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", kind.title());
    if report.is_empty() {
        println!("No rows match the given filters.");
        return Ok(());
    }

    println!("{}", render_table(&report));
    println!();
    println!("Rows: {}", report.len());

    Ok(())
}

fn cmd_export(
    cfg_dir: &Path,
    kind: ReportKind,
    filters: FilterParams,
    output: Option<PathBuf>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let records = load_records(cfg_dir)?;

    let report = Report::build(&records, kind, &filters)?;

    if output.as_deref() == Some(Path::new("-")) {
        write_report(&report, io::stdout().lock())?;
        return Ok(());
    }

    let path = match output {
        Some(path) => path,
        None => {
            let config = load_config(cfg_dir)?;
            let output_dir = resolve_output_dir(&config.report.output_dir, cfg_dir);
            fs::create_dir_all(&output_dir)?;
            output_dir.join(kind.file_name())
        }
    };

    let file = BufWriter::new(File::create(&path)?);
    write_report(&report, file)?;

    println!("Exported {} rows to {}", report.len(), path.display());
    Ok(())
}
