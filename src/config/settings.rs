use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub business: Business,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Business {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Where `export` writes CSV files when no --output is given
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_output_dir() -> String {
    "exports".to_string()
}
