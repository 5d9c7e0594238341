mod settings;

pub use settings::{Business, Config, ReportSettings};

use crate::error::{BillingError, Result};
use crate::store::Records;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the data directory path (XDG config dir, falling back to ~/.billing/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "billing") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".billing"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export directory; relative paths live under the data directory
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Load records.toml (empty if missing)
pub fn load_records(config_dir: &Path) -> Result<Records> {
    let path = config_dir.join("records.toml");
    if !path.exists() {
        return Ok(Records::default());
    }
    let content = fs::read_to_string(&path)?;
    let records: Records =
        toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })?;
    tracing::debug!(
        customers = records.customers.len(),
        invoices = records.invoices.len(),
        payments = records.payments.len(),
        "loaded records"
    );
    Ok(records)
}

/// Save records.toml
pub fn save_records(config_dir: &Path, records: &Records) -> Result<()> {
    let path = config_dir.join("records.toml");
    let content = toml::to_string_pretty(records)?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[business]
name = "Your Business Name"
# email = "billing@yourbusiness.com"   # optional

[report]
currency_symbol = "$"
output_dir = "exports"   # relative to this directory, or an absolute / ~/ path
"#;

/// Template content for records.toml
pub const RECORDS_TEMPLATE: &str = r#"# Billing records. Manage them with the billing CLI:
#
#   billing add-customer "Acme Corp"
#   billing add-product "Widget" --sku W-1 --price 25.00
#   billing add-invoice --customer 1 --item 1:4
#   billing add-payment --invoice 1 --amount 40.00
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn relative_output_dir_resolves_under_config_dir() {
        let base = Path::new("/srv/billing");
        assert_eq!(
            resolve_output_dir("exports", base),
            PathBuf::from("/srv/billing/exports")
        );
        assert_eq!(resolve_output_dir("/tmp/out", base), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn templates_parse() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.report.currency_symbol, "$");
        let records: Records = toml::from_str(RECORDS_TEMPLATE).unwrap();
        assert!(records.invoices.is_empty());
    }

    #[test]
    fn missing_records_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let records = load_records(dir.path()).unwrap();
        assert!(records.customers.is_empty());
    }

    #[test]
    fn broken_config_reports_its_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[business\nname = 1").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
