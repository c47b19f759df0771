use crate::fetch::traits::FeedClient;
use crate::model::{FetchOutcome, Source, Termination};
use crate::parser::parse_page;

use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("BidScout/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        Self { client }
    }
}

impl Default for HttpFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_all(&self, source: Source, params: &[(String, String)]) -> FetchOutcome {
        let page_size = source.page_size();
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query = params.to_vec();
            query.push(("pageNo".into(), page.to_string()));
            query.push(("numOfRows".into(), page_size.to_string()));
            if source == Source::RdNotice {
                query.push(("type".into(), "xml".into()));
            }

            let response = match self.client.get(source.endpoint()).query(&query).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("{}: transport error on page {}: {}", source.label(), page, e);
                    return FetchOutcome { items, partial: true };
                }
            };

            let status = response.status();
            if !status.is_success() {
                if source == Source::RdNotice && page == 1 && status.as_u16() == 500 {
                    warn!(
                        "R&D feed returned HTTP 500 on the first page (requested {} rows)",
                        page_size
                    );
                } else {
                    warn!(
                        "{}: HTTP {} on page {}, keeping {} accumulated records",
                        source.label(),
                        status.as_u16(),
                        page,
                        items.len()
                    );
                }
                return FetchOutcome { items, partial: true };
            }

            let body = match response.text().await {
                Ok(b) => b,
                Err(e) => {
                    warn!("{}: failed to read page {}: {}", source.label(), page, e);
                    return FetchOutcome { items, partial: true };
                }
            };

            let parsed = match parse_page(&body) {
                Ok(p) => p,
                Err(e) => {
                    warn!("{}: page {}: {}", source.label(), page, e);
                    return FetchOutcome { items, partial: true };
                }
            };

            if parsed.items.is_empty() {
                break;
            }
            let page_len = parsed.items.len();
            items.extend(parsed.items);

            if page_complete(source, page, page_len, items.len(), parsed.total_count) {
                break;
            }
            page += 1;
        }

        FetchOutcome { items, partial: false }
    }
}

/// Termination policy, evaluated after each non-empty page.
pub fn page_complete(
    source: Source,
    page: u32,
    page_len: usize,
    accumulated: usize,
    total_count: Option<usize>,
) -> bool {
    match source.termination() {
        Termination::ShortPageOrCap { cap } => page_len < source.page_size() || page >= cap,
        // A body without totalCount keeps paging until an empty page shows up.
        Termination::TotalCount => total_count.is_some_and(|total| accumulated >= total),
    }
}

/// Order-plan query for one keyword and one business-division code ("03"/"05").
pub fn order_params(service_key: &str, year: i32, division_code: &str, keyword: &str) -> Vec<(String, String)> {
    vec![
        ("serviceKey".into(), service_key.into()),
        ("type".into(), "xml".into()),
        ("inqryBgnDt".into(), format!("{year}01010000")),
        ("inqryEndDt".into(), format!("{year}12312359")),
        ("orderBgnYm".into(), format!("{}12", year - 1)),
        ("orderEndYm".into(), format!("{year}12")),
        ("bsnsDivCd".into(), division_code.into()),
        ("bizNm".into(), keyword.into()),
    ]
}

/// Pre-specification query for one keyword over one calendar year.
pub fn prior_params(service_key: &str, year: i32, keyword: &str) -> Vec<(String, String)> {
    vec![
        ("serviceKey".into(), service_key.into()),
        ("type".into(), "xml".into()),
        ("inqryDiv".into(), "1".into()),
        ("inqryBgnDt".into(), format!("{year}01010000")),
        ("inqryEndDt".into(), format!("{year}12312359")),
        ("prdctClsfcNoNm".into(), keyword.into()),
    ]
}

/// Bid-notice query for one keyword within one 30-day window.
pub fn bid_params(service_key: &str, begin: &str, end: &str, keyword: &str) -> Vec<(String, String)> {
    vec![
        ("serviceKey".into(), service_key.into()),
        ("type".into(), "xml".into()),
        ("inqryDiv".into(), "1".into()),
        ("inqryBgnDt".into(), begin.into()),
        ("inqryEndDt".into(), end.into()),
        ("bidNtceNm".into(), keyword.into()),
    ]
}

/// R&D notices are fetched as a full list and filtered client-side.
pub fn rd_params(service_key: &str) -> Vec<(String, String)> {
    vec![("serviceKey".into(), service_key.into())]
}
