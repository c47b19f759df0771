// Core structs: Source, RawRecord, NormalizedTable, pipeline outcomes
use std::collections::BTreeMap;
use thiserror::Error;

/// One parsed feed item: tag -> trimmed text, exactly as the XML delivered it.
pub type RawRecord = BTreeMap<String, String>;

/// The four upstream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    OrderPlan,
    PriorSpec,
    BidNotice,
    RdNotice,
}

/// When a paginated fetch loop is allowed to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop once the accumulated item count reaches the reported totalCount.
    TotalCount,
    /// Stop on a short page or once the page index reaches the cap.
    ShortPageOrCap { cap: u32 },
}

impl Source {
    pub fn endpoint(self) -> &'static str {
        match self {
            Source::OrderPlan => {
                "https://apis.data.go.kr/1230000/ao/OrderPlanSttusService/getOrderPlanSttusListServcPPSSrch"
            }
            Source::PriorSpec => {
                "https://apis.data.go.kr/1230000/ao/HrcspSsstndrdInfoService/getPublicPrcureThngInfoServcPPSSrch"
            }
            Source::BidNotice => {
                "https://apis.data.go.kr/1230000/ad/BidPublicInfoService/getBidPblancListInfoServcPPSSrch"
            }
            Source::RdNotice => {
                "http://apis.data.go.kr/1721000/msitBusinessNotice/getMsitBusinessNoticeList"
            }
        }
    }

    /// The R&D feed falls over on large pages, so it gets a reduced size.
    pub fn page_size(self) -> usize {
        match self {
            Source::RdNotice => 10,
            _ => 500,
        }
    }

    pub fn termination(self) -> Termination {
        match self {
            Source::RdNotice => Termination::ShortPageOrCap { cap: 30 },
            _ => Termination::TotalCount,
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Source::OrderPlan => "Order Plans",
            Source::PriorSpec => "Pre-Specifications",
            Source::BidNotice => "Bid Notices",
            Source::RdNotice => "R&D Notices",
        }
    }

    /// Short tag used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            Source::OrderPlan => "order-plan",
            Source::PriorSpec => "prior-spec",
            Source::BidNotice => "bid-notice",
            Source::RdNotice => "rd-notice",
        }
    }
}

/// A normalized cell. Money cells are coerced integers; everything else stays text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Money(i64),
}

impl CellValue {
    pub fn as_text(&self) -> &str {
        match self {
            CellValue::Text(s) => s,
            CellValue::Money(_) => "",
        }
    }

    pub fn as_money(&self) -> i64 {
        match self {
            CellValue::Money(v) => *v,
            CellValue::Text(_) => 0,
        }
    }
}

/// One output row. `index` is the dense 1-based "No." assigned after
/// filtering and sorting; `values` follows the source's canonical schema.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub index: usize,
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub source: Source,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Result of one paginated fetch. `partial` marks a loop that aborted on a
/// transport, HTTP or parse failure and returned whatever it had.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<RawRecord>,
    pub partial: bool,
}

/// Normalized table for one source plus the degradation marker of its fetch.
#[derive(Debug)]
pub struct SourceOutcome {
    pub table: NormalizedTable,
    pub partial: bool,
}

/// Everything one pipeline run produced. `None` means the source was not selected.
#[derive(Debug, Default)]
pub struct PipelineResult {
    pub order: Option<SourceOutcome>,
    pub prior: Option<SourceOutcome>,
    pub bid: Option<SourceOutcome>,
    pub rd: Option<SourceOutcome>,
}

impl PipelineResult {
    /// Selected sources in fixed sheet order.
    pub fn entries(&self) -> Vec<(Source, &SourceOutcome)> {
        [
            (Source::OrderPlan, &self.order),
            (Source::PriorSpec, &self.prior),
            (Source::BidNotice, &self.bid),
            (Source::RdNotice, &self.rd),
        ]
        .into_iter()
        .filter_map(|(source, outcome)| outcome.as_ref().map(|o| (source, o)))
        .collect()
    }
}

/// Observer for coarse-grained progress: per keyword for the calendar-year
/// feeds, per 30-day window for the bid feed.
pub trait ProgressObserver: Send + Sync {
    fn progress(&self, current: u32, total: u32);
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("xml parse error: {0}")]
    Xml(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
