// Canonical per-source schemas. Column order here is the output column
// order; aliases are tried in priority order, case-insensitively.
use crate::model::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Money,
}

pub struct ColumnSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ValueKind,
}

const fn text(name: &'static str, aliases: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec { name, aliases, kind: ValueKind::Text }
}

const fn money(name: &'static str, aliases: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec { name, aliases, kind: ValueKind::Money }
}

// Columns with no aliases are derived after alias resolution.
pub const ORDER_PLAN: &[ColumnSpec] = &[
    text("Service Division", &[]),
    text("Business Category", &["bsnsTyNm", "bztyNm"]),
    text("Order Timing", &[]),
    text("Project Name", &["bizNm", "prdctClsfNoNm", "prdctClsfcNoNm", "cntrctNm"]),
    money("Total Order Amount (KRW)", &["sumOrderAmt", "totlAmt"]),
    text("Ordering Agency", &["orderInsttNm", "dmndInsttNm", "realOrgNm"]),
    text("Posted Date", &["nticeDt", "opengDt"]),
];

pub const PRIOR_SPEC: &[ColumnSpec] = &[
    text("Business Division", &["bsnsDivNm"]),
    text("Reference No", &["refNo"]),
    text("Product Name", &["prdctClsfcNoNm"]),
    text("Ordering Agency", &["orderInsttNm"]),
    text("Demand Agency", &["rlDminsttNm"]),
    money("Allocated Budget (KRW)", &["asignBdgtAmt"]),
    text("Disclosure Date", &["rcptDt"]),
    text("Opinion Deadline", &["opninRgstClseDt"]),
    text("Officer Name", &["ofclNm"]),
    text("Officer Phone", &["ofclTelNo"]),
    text("SW Project", &["swBizObjYn"]),
    text("Delivery Deadline", &["dlvrTmlmtDt"]),
    text("Delivery Days", &["dlvrDaynum"]),
    text("Pre-Spec Registration No", &["bfSpecRgstNo"]),
    text("Spec Document URL", &["specDocFileUrl1"]),
    text("Registered At", &["rgstDt"]),
    text("Changed At", &["chgDt"]),
    text("Linked Notice Nos", &["bidNtceNoList"]),
];

pub const BID_NOTICE: &[ColumnSpec] = &[
    text("Notice No", &["bidNtceNo"]),
    text("Notice Round", &["bidNtceOrd"]),
    text("Renotice", &["reNtceYn"]),
    text("Notice Title", &["bidNtceNm"]),
    text("Notice Kind", &["ntceKindNm"]),
    text("Bid Method", &["bidMethdNm"]),
    text("Contract Method", &["cntrctCnclsMthdNm"]),
    text("Award Method", &["sucsfbidMthdNm"]),
    text("Notice Agency", &["ntceInsttNm"]),
    text("Demand Agency", &["dminsttNm"]),
    text("Officer Name", &["ntceInsttOfclNm"]),
    text("Officer Phone", &["ntceInsttOfclTelNo"]),
    text("Posted At", &["bidNtceDt"]),
    text("Bid Open At", &["bidBeginDt"]),
    text("Bid Close At", &["bidClseDt"]),
    text("Opening At", &["opengDt"]),
    text("Qualification Deadline", &["bidQlfctRgstDt"]),
    money("Allocated Budget (KRW)", &["asignBdgtAmt"]),
    money("Estimated Price (KRW)", &["presmptPrce"]),
    money("Participation Fee (KRW)", &["bidPrtcptFee"]),
    text("Notice URL", &["bidNtceUrl"]),
    text("Pre-Spec Registration No", &["bfSpecRgstNo"]),
    text("Reference No", &["refNo"]),
    text("Joint Supply-Demand", &["cmmnSpldmdMethdNm"]),
    text("Price Decision Method", &["prearngPrceDcsnMthdNm"]),
    text("Opening Place", &["opengPlce"]),
    text("Branch Bidding Allowed", &["brffcBidprcPermsnYn"]),
    money("Expected Minimum Bid (KRW)", &[]),
];

pub const RD_NOTICE: &[ColumnSpec] = &[
    text("Notice Title", &["subject"]),
    text("Agency", &["deptName"]),
    text("Posted Date", &["regDate"]),
    text("Notice URL", &["viewUrl"]),
];

pub fn schema(source: Source) -> &'static [ColumnSpec] {
    match source {
        Source::OrderPlan => ORDER_PLAN,
        Source::PriorSpec => PRIOR_SPEC,
        Source::BidNotice => BID_NOTICE,
        Source::RdNotice => RD_NOTICE,
    }
}

/// Column whose emptiness invalidates a row, and which the keyword filters
/// match against.
pub fn title_column(source: Source) -> &'static str {
    match source {
        Source::OrderPlan => "Project Name",
        Source::PriorSpec => "Product Name",
        Source::BidNotice => "Notice Title",
        Source::RdNotice => "Notice Title",
    }
}

/// (sort column, descending). Sort keys are compared as raw strings; the
/// feeds' date formats order lexicographically.
pub fn sort_spec(source: Source) -> (&'static str, bool) {
    match source {
        Source::OrderPlan => ("Order Timing", false),
        Source::PriorSpec => ("Disclosure Date", false),
        Source::BidNotice => ("Posted At", false),
        Source::RdNotice => ("Posted Date", true),
    }
}

pub fn column_index(schema: &[ColumnSpec], name: &str) -> usize {
    schema
        .iter()
        .position(|col| col.name == name)
        .expect("column name present in its own schema")
}
