// Pipeline: one pure invocation that fetches every selected source,
// normalizes it, and hands the tables back to the caller.
use crate::fetch::{FeedClient, fetch_bid_windows, order_params, prior_params, rd_params};
use crate::model::{
    FetchOutcome, PipelineResult, ProgressObserver, Source, SourceOutcome,
};
use crate::normalize::normalize;

use chrono::Local;
use tracing::info;

/// Everything the caller decides: what to search, where, and how far back.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub service_key: String,
    pub keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// Calendar year queried for order plans, pre-specifications and bids.
    pub year: i32,
    /// Bid-notice lookback in 30-day windows.
    pub bid_months: u32,
    pub sources: SourceSelection,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceSelection {
    pub order: bool,
    pub prior: bool,
    pub bid: bool,
    pub rd: bool,
}

/// Order-plan feeds are queried per business-division code.
const ORDER_DIVISION_CODES: [&str; 2] = ["03", "05"];

/// Runs the whole pipeline sequentially: R&D first, then the calendar-year
/// feeds keyword by keyword, then the windowed bid feed. Fetch failures
/// degrade to partial tables; nothing here aborts the run.
pub async fn run(
    client: &dyn FeedClient,
    params: &SearchParams,
    observer: &dyn ProgressObserver,
) -> PipelineResult {
    let mut result = PipelineResult::default();

    if params.sources.rd {
        info!("fetching rd-notice (full list, filtered by keyword)");
        let outcome = client
            .fetch_all(Source::RdNotice, &rd_params(&params.service_key))
            .await;
        result.rd = Some(finish(Source::RdNotice, outcome, params));
    }

    if params.sources.order || params.sources.prior {
        let total = params.keywords.len() as u32;
        let mut order_outcome = FetchOutcome::default();
        let mut prior_outcome = FetchOutcome::default();

        for (i, keyword) in params.keywords.iter().enumerate() {
            if params.sources.order {
                for code in ORDER_DIVISION_CODES {
                    let fetched = client
                        .fetch_all(
                            Source::OrderPlan,
                            &order_params(&params.service_key, params.year, code, keyword),
                        )
                        .await;
                    order_outcome.partial |= fetched.partial;
                    order_outcome.items.extend(fetched.items);
                }
            }
            if params.sources.prior {
                let fetched = client
                    .fetch_all(
                        Source::PriorSpec,
                        &prior_params(&params.service_key, params.year, keyword),
                    )
                    .await;
                prior_outcome.partial |= fetched.partial;
                prior_outcome.items.extend(fetched.items);
            }
            observer.progress(i as u32 + 1, total);
        }

        if params.sources.order {
            result.order = Some(finish(Source::OrderPlan, order_outcome, params));
        }
        if params.sources.prior {
            result.prior = Some(finish(Source::PriorSpec, prior_outcome, params));
        }
    }

    if params.sources.bid {
        let outcome = fetch_bid_windows(
            client,
            &params.service_key,
            &params.keywords,
            params.bid_months,
            Local::now(),
            observer,
        )
        .await;
        result.bid = Some(finish(Source::BidNotice, outcome, params));
    }

    for (source, outcome) in result.entries() {
        info!(
            "{}: {} rows{}",
            source.label(),
            outcome.table.len(),
            if outcome.partial { " (partial)" } else { "" }
        );
    }

    result
}

fn finish(source: Source, outcome: FetchOutcome, params: &SearchParams) -> SourceOutcome {
    let table = normalize(source, outcome.items, &params.keywords, &params.exclude_keywords);
    SourceOutcome { table, partial: outcome.partial }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRecord;
    use std::sync::Mutex;

    struct StubClient {
        /// Records handed out on every call, regardless of source.
        canned: Vec<RawRecord>,
        partial: bool,
        calls: Mutex<Vec<Source>>,
    }

    #[async_trait::async_trait]
    impl FeedClient for StubClient {
        async fn fetch_all(&self, source: Source, _params: &[(String, String)]) -> FetchOutcome {
            self.calls.lock().unwrap().push(source);
            FetchOutcome { items: self.canned.clone(), partial: self.partial }
        }
    }

    struct CountingObserver(Mutex<Vec<(u32, u32)>>);

    impl ProgressObserver for CountingObserver {
        fn progress(&self, current: u32, total: u32) {
            self.0.lock().unwrap().push((current, total));
        }
    }

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn params(sources: SourceSelection) -> SearchParams {
        SearchParams {
            service_key: "test-key".into(),
            keywords: vec!["radiation".into(), "nuclear".into()],
            exclude_keywords: vec![],
            year: 2026,
            bid_months: 2,
            sources,
        }
    }

    #[tokio::test]
    async fn order_plan_fetches_both_division_codes_per_keyword() {
        let client = StubClient {
            canned: vec![record(&[("bizNm", "Survey"), ("orderYear", "2026"), ("orderMnth", "1")])],
            partial: false,
            calls: Mutex::new(Vec::new()),
        };
        let observer = CountingObserver(Mutex::new(Vec::new()));
        let selection = SourceSelection { order: true, ..Default::default() };

        let result = run(&client, &params(selection), &observer).await;

        // 2 keywords x 2 division codes.
        assert_eq!(client.calls.lock().unwrap().len(), 4);
        let order = result.order.unwrap();
        assert!(!order.partial);
        // Identical canned records collapse to one row via dedup.
        assert_eq!(order.table.len(), 1);
        assert_eq!(*observer.0.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn partial_fetch_marks_the_source_outcome() {
        let client = StubClient {
            canned: vec![record(&[("prdctClsfcNoNm", "Detector calibration")])],
            partial: true,
            calls: Mutex::new(Vec::new()),
        };
        let observer = CountingObserver(Mutex::new(Vec::new()));
        let selection = SourceSelection { prior: true, ..Default::default() };

        let result = run(&client, &params(selection), &observer).await;

        let prior = result.prior.unwrap();
        assert!(prior.partial);
        assert_eq!(prior.table.len(), 1);
        assert!(result.order.is_none());
        assert!(result.bid.is_none());
        assert!(result.rd.is_none());
    }

    #[tokio::test]
    async fn bid_source_reports_progress_per_window() {
        let client = StubClient {
            canned: vec![record(&[("bidNtceNm", "radiation shielding"), ("bidNtceDt", "2026-01-05 09:00")])],
            partial: false,
            calls: Mutex::new(Vec::new()),
        };
        let observer = CountingObserver(Mutex::new(Vec::new()));
        let selection = SourceSelection { bid: true, ..Default::default() };

        let result = run(&client, &params(selection), &observer).await;

        // 2 windows x 2 keywords.
        assert_eq!(client.calls.lock().unwrap().len(), 4);
        assert_eq!(*observer.0.lock().unwrap(), vec![(1, 2), (2, 2)]);
        assert_eq!(result.bid.unwrap().table.len(), 1);
    }

    #[tokio::test]
    async fn rd_source_applies_the_inclusion_filter() {
        let client = StubClient {
            canned: vec![
                record(&[("subject", "Call on radiation detectors"), ("regDate", "2026-01-01")]),
                record(&[("subject", "Unrelated AI program"), ("regDate", "2026-01-02")]),
            ],
            partial: false,
            calls: Mutex::new(Vec::new()),
        };
        let observer = CountingObserver(Mutex::new(Vec::new()));
        let selection = SourceSelection { rd: true, ..Default::default() };

        let result = run(&client, &params(selection), &observer).await;

        let rd = result.rd.unwrap();
        assert_eq!(rd.table.len(), 1);
        assert_eq!(rd.table.rows[0].values[0].as_text(), "Call on radiation detectors");
    }
}
