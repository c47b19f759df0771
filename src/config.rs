use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SourceToggles {
    pub order: bool,
    pub prior: bool,
    pub bid: bool,
    pub rd: bool,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Personal data.go.kr service key. Validated before the pipeline runs.
    pub service_key: String,
    pub keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub year: i32,
    pub bid_months: u32,
    pub sources: SourceToggles,
    /// Workbook destination; defaults to a dated filename when omitted.
    pub output_path: Option<String>,
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
