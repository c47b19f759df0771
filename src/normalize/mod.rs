// Normalizer: raw records -> canonical rows (alias resolution, coercion,
// derived fields, filtering, sorting, numbering).

pub mod schema;

use crate::model::{CellValue, NormalizedRow, NormalizedTable, RawRecord, Source};
use schema::{ColumnSpec, ValueKind, column_index, schema, sort_spec, title_column};
use std::collections::HashSet;

/// Fraction of the base price that forms the lowest admissible bid.
const MIN_BID_RATE: f64 = 0.87745;

/// Builds the canonical table for one source from freshly fetched records.
/// Exact raw duplicates are dropped first; filters and the sort follow the
/// source's schema rules, then rows get their dense 1-based index.
pub fn normalize(
    source: Source,
    raws: Vec<RawRecord>,
    keywords: &[String],
    exclude_keywords: &[String],
) -> NormalizedTable {
    let columns = schema(source);
    let mut seen: HashSet<RawRecord> = HashSet::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    for raw in raws {
        if !seen.insert(raw.clone()) {
            continue;
        }
        let mut values: Vec<CellValue> = columns.iter().map(|col| resolve_cell(&raw, col)).collect();
        match source {
            Source::OrderPlan => derive_order_fields(&raw, columns, &mut values),
            Source::BidNotice => derive_minimum_bid(columns, &mut values),
            _ => {}
        }
        rows.push(values);
    }

    let title_idx = column_index(columns, title_column(source));
    rows.retain(|values| !values[title_idx].as_text().trim().is_empty());

    // The R&D feed is fetched unfiltered, so keywords are applied here.
    if source == Source::RdNotice && !keywords.is_empty() {
        rows.retain(|values| {
            let title = values[title_idx].as_text();
            keywords.iter().any(|kw| title.contains(kw.as_str()))
        });
    }
    if !exclude_keywords.is_empty() {
        rows.retain(|values| {
            let title = values[title_idx].as_text();
            !exclude_keywords.iter().any(|kw| title.contains(kw.as_str()))
        });
    }

    let (sort_column, descending) = sort_spec(source);
    let sort_idx = column_index(columns, sort_column);
    rows.sort_by(|a, b| {
        let ord = a[sort_idx].as_text().cmp(b[sort_idx].as_text());
        if descending { ord.reverse() } else { ord }
    });

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, values)| NormalizedRow { index: i + 1, values })
        .collect();

    NormalizedTable { source, rows }
}

fn resolve_cell(raw: &RawRecord, col: &ColumnSpec) -> CellValue {
    let resolved = resolve_alias(raw, col.aliases);
    match col.kind {
        ValueKind::Text => CellValue::Text(resolved.unwrap_or("").to_string()),
        ValueKind::Money => CellValue::Money(resolved.map(parse_money).unwrap_or(0)),
    }
}

/// Priority-ordered alias lookup: exact tag first, then case-insensitive;
/// the first non-empty value wins.
pub fn resolve_alias<'a>(raw: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(value) = raw.get(*alias) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value);
            }
        }
        for (tag, value) in raw {
            if tag.eq_ignore_ascii_case(alias) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// "1,234,567" -> 1234567; anything unparseable -> 0. Fractions truncate
/// toward zero.
pub fn parse_money(raw: &str) -> i64 {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .map(|v| v.trunc() as i64)
        .unwrap_or(0)
}

fn derive_order_fields(raw: &RawRecord, columns: &[ColumnSpec], values: &mut [CellValue]) {
    let division = match resolve_alias(raw, &["bsnsDivCd"]).unwrap_or("") {
        "03" => "General Service",
        "05" => "Technical Service",
        _ => "",
    };
    values[column_index(columns, "Service Division")] = CellValue::Text(division.to_string());

    let timing = match resolve_alias(raw, &["orderYear"]) {
        Some(year) => {
            let month = resolve_alias(raw, &["orderMnth"]).unwrap_or("");
            format!("{year}/{month:0>2}")
        }
        None => String::new(),
    };
    values[column_index(columns, "Order Timing")] = CellValue::Text(timing);
}

fn derive_minimum_bid(columns: &[ColumnSpec], values: &mut [CellValue]) {
    let budget = values[column_index(columns, "Allocated Budget (KRW)")].as_money();
    let estimate = values[column_index(columns, "Estimated Price (KRW)")].as_money();
    let base = if budget > 0 { budget } else { estimate };
    let min_bid = if base > 0 { (base as f64 * MIN_BID_RATE).floor() as i64 } else { 0 };
    values[column_index(columns, "Expected Minimum Bid (KRW)")] = CellValue::Money(min_bid);
}
