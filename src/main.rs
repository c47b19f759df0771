mod config;
mod exporter;
mod fetch;
mod model;
mod normalize;
mod parser;
mod pipeline;

use chrono::Local;
use config::load_config;
use fetch::HttpFeedClient;
use model::ProgressObserver;
use pipeline::{SearchParams, SourceSelection};
use std::fs;
use tracing::{error, info, warn};

/// Logs pipeline progress; a UI front-end would swap in its own observer.
struct LogProgress;

impl ProgressObserver for LogProgress {
    fn progress(&self, current: u32, total: u32) {
        info!("progress: {}/{}", current, total);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    // The pipeline itself never validates credentials; that is on the caller.
    if config.service_key.trim().is_empty() {
        error!("A data.go.kr service key is required (set `service_key` in config.json)");
        return;
    }

    let keywords: Vec<String> = config
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    let exclude_keywords: Vec<String> = config
        .exclude_keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let params = SearchParams {
        service_key: config.service_key.trim().to_string(),
        keywords,
        exclude_keywords,
        year: config.year,
        bid_months: config.bid_months,
        sources: SourceSelection {
            order: config.sources.order,
            prior: config.sources.prior,
            bid: config.sources.bid,
            rd: config.sources.rd,
        },
    };

    info!(
        "Starting search: year {}, keywords {:?}, excludes {:?}",
        params.year, params.keywords, params.exclude_keywords
    );

    let client = HttpFeedClient::new();
    let result = pipeline::run(&client, &params, &LogProgress).await;

    let entries = result.entries();
    if entries.is_empty() {
        warn!("No sources selected; nothing to export");
        return;
    }
    for (source, outcome) in &entries {
        if outcome.partial {
            warn!(
                "{}: fetch aborted early, results are incomplete",
                source.label()
            );
        }
    }

    let buffer = match exporter::build_workbook(&result, Local::now().naive_local()) {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("Workbook build failed: {}", e);
            return;
        }
    };

    let path = config
        .output_path
        .unwrap_or_else(|| format!("procurement_{}.xlsx", Local::now().format("%Y%m%d")));
    if let Err(e) = fs::write(&path, &buffer) {
        error!("Failed to write {}: {}", path, e);
        return;
    }
    info!("Workbook written to {}", path);
}
