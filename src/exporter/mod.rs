// Exporter: renders normalized tables into one styled xlsx workbook.

pub mod style;

use crate::model::{CellValue, ExportError, NormalizedRow, NormalizedTable, PipelineResult, Source};
use crate::normalize::schema::{ValueKind, schema};
use style::{SheetStyleRule, column_width, is_urgent, style_rule};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline, Workbook, Worksheet};

pub const EMPTY_SHEET_MESSAGE: &str = "No results matched the search criteria.";

const HEADER_FILL: u32 = 0xE7E6E6;
const URGENT_FILL: u32 = 0xFFFF00;
const URGENT_FONT: u32 = 0xFF0000;
const LINK_FONT: u32 = 0x0000FF;

/// Builds the workbook for one pipeline run: one sheet per selected source,
/// in fixed order. Returns the serialized xlsx bytes.
pub fn build_workbook(result: &PipelineResult, now: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    for (source, outcome) in result.entries() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(source.sheet_name())?;
        write_sheet(sheet, source, &outcome.table, now)?;
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    sheet: &mut Worksheet,
    source: Source,
    table: &NormalizedTable,
    now: NaiveDateTime,
) -> Result<(), ExportError> {
    if table.is_empty() {
        sheet.write_string(0, 0, "Result")?;
        sheet.write_string(1, 0, EMPTY_SHEET_MESSAGE)?;
        return Ok(());
    }

    let columns = schema(source);
    let rule = style_rule(source);

    // Header row: "No." plus the canonical columns.
    let headers: Vec<&str> = std::iter::once("No.")
        .chain(columns.iter().map(|col| col.name))
        .collect();
    let header_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);
    for (c, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *header, &header_format)?;
    }

    let formats: Vec<ColumnFormats> = headers
        .iter()
        .enumerate()
        .map(|(c, header)| {
            let kind = if c == 0 { ValueKind::Text } else { columns[c - 1].kind };
            ColumnFormats::build(header, kind, rule)
        })
        .collect();

    let deadline_idx = rule
        .deadline_column
        .and_then(|name| headers.iter().position(|h| *h == name));

    for (r, row) in table.rows.iter().enumerate() {
        let row_idx = r as u32 + 1;
        let urgent = deadline_idx
            .map(|idx| is_urgent(cell_text(row, idx), now))
            .unwrap_or(false);

        for (c, header) in headers.iter().enumerate() {
            let col = c as u16;
            let fmt = &formats[c];
            if c == 0 {
                let base = if urgent { &fmt.urgent } else { &fmt.base };
                sheet.write_number_with_format(row_idx, col, row.index as f64, base)?;
                continue;
            }
            match &row.values[c - 1] {
                CellValue::Money(v) => {
                    let base = if urgent { &fmt.urgent } else { &fmt.base };
                    sheet.write_number_with_format(row_idx, col, *v as f64, base)?;
                }
                CellValue::Text(s) => {
                    if rule.url_columns.contains(header) && s.starts_with("http") {
                        // Link font wins over the urgent font; the urgent
                        // fill still applies.
                        let link = if urgent { &fmt.link_urgent } else { &fmt.link };
                        sheet.write_url_with_format(row_idx, col, s.as_str(), link)?;
                    } else {
                        let base = if urgent { &fmt.urgent } else { &fmt.base };
                        sheet.write_string_with_format(row_idx, col, s, base)?;
                    }
                }
            }
        }
    }

    size_columns(sheet, table, &headers, rule)?;
    sheet.autofilter(0, 0, table.len() as u32, (headers.len() - 1) as u16)?;

    Ok(())
}

fn size_columns(
    sheet: &mut Worksheet,
    table: &NormalizedTable,
    headers: &[&str],
    rule: &SheetStyleRule,
) -> Result<(), ExportError> {
    for (c, header) in headers.iter().enumerate() {
        let col = c as u16;
        if let Some((_, width)) = rule.custom_widths.iter().find(|(name, _)| name == header) {
            sheet.set_column_width(col, *width)?;
            continue;
        }
        let mut max_len = header.chars().count();
        for row in &table.rows {
            let len = if c == 0 {
                row.index.to_string().len()
            } else {
                match &row.values[c - 1] {
                    CellValue::Text(s) => s.chars().count(),
                    CellValue::Money(v) => v.to_string().len(),
                }
            };
            max_len = max_len.max(len);
        }
        sheet.set_column_width(col, column_width(max_len, rule.left.contains(header)))?;
    }
    Ok(())
}

fn cell_text(row: &NormalizedRow, header_idx: usize) -> &str {
    // header_idx 0 is the "No." column, which is never a deadline.
    if header_idx == 0 {
        return "";
    }
    row.values[header_idx - 1].as_text()
}

/// The format variants a column can need, built once per column.
struct ColumnFormats {
    base: Format,
    urgent: Format,
    link: Format,
    link_urgent: Format,
}

impl ColumnFormats {
    fn build(header: &str, kind: ValueKind, rule: &SheetStyleRule) -> Self {
        let mut base = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::VerticalCenter);
        base = if rule.left.contains(&header) {
            base.set_align(FormatAlign::Left).set_indent(1)
        } else if rule.right.contains(&header) {
            base.set_align(FormatAlign::Right).set_indent(1)
        } else {
            base.set_align(FormatAlign::Center)
        };
        if kind == ValueKind::Money {
            base = base.set_num_format("#,##0");
        }
        let urgent = base
            .clone()
            .set_bold()
            .set_font_color(Color::RGB(URGENT_FONT))
            .set_background_color(Color::RGB(URGENT_FILL));
        let link = base
            .clone()
            .set_font_color(Color::RGB(LINK_FONT))
            .set_underline(FormatUnderline::Single);
        let link_urgent = link.clone().set_background_color(Color::RGB(URGENT_FILL));
        Self { base, urgent, link, link_urgent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormalizedTable, PipelineResult, RawRecord, SourceOutcome};
    use crate::normalize::normalize;
    use calamine::{Data, Range, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn result_with(source: Source, table: NormalizedTable) -> PipelineResult {
        let outcome = Some(SourceOutcome { table, partial: false });
        match source {
            Source::OrderPlan => PipelineResult { order: outcome, ..Default::default() },
            Source::PriorSpec => PipelineResult { prior: outcome, ..Default::default() },
            Source::BidNotice => PipelineResult { bid: outcome, ..Default::default() },
            Source::RdNotice => PipelineResult { rd: outcome, ..Default::default() },
        }
    }

    fn read_sheet(buffer: Vec<u8>, name: &str) -> Range<Data> {
        let mut workbook = Xlsx::new(Cursor::new(buffer)).unwrap();
        workbook.worksheet_range(name).unwrap()
    }

    fn bid_record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn string_at(range: &Range<Data>, row: u32, col: u32) -> String {
        range.get_value((row, col)).map(|v| v.to_string()).unwrap_or_default()
    }

    fn header_col(range: &Range<Data>, name: &str) -> u32 {
        (0..range.get_size().1 as u32)
            .find(|&c| string_at(range, 0, c) == name)
            .unwrap()
    }

    #[test]
    fn empty_table_renders_placeholder_sheet() {
        let table = NormalizedTable { source: Source::BidNotice, rows: Vec::new() };
        let buffer = build_workbook(&result_with(Source::BidNotice, table), now()).unwrap();

        let range = read_sheet(buffer, Source::BidNotice.sheet_name());
        // One column, one data row: the placeholder and nothing else.
        assert_eq!(range.get_size(), (2, 1));
        assert_eq!(string_at(&range, 0, 0), "Result");
        assert_eq!(string_at(&range, 1, 0), EMPTY_SHEET_MESSAGE);
    }

    #[test]
    fn populated_sheet_carries_headers_index_and_values() {
        let raws = vec![bid_record(&[
            ("bidNtceNm", "Radiation survey"),
            ("bidNtceDt", "2026-02-01 10:00"),
            ("bidClseDt", "2026-02-12 17:00"),
            ("asignBdgtAmt", "1,000,000"),
            ("presmptPrce", "0"),
            ("bidNtceUrl", "https://example.org/notice/1"),
        ])];
        let table = normalize(Source::BidNotice, raws, &[], &[]);
        assert_eq!(table.len(), 1);
        let buffer = build_workbook(&result_with(Source::BidNotice, table), now()).unwrap();

        let range = read_sheet(buffer, Source::BidNotice.sheet_name());
        // Header row plus one data row, "No." leading the canonical columns.
        assert_eq!(range.get_size().0, 2);
        assert_eq!(string_at(&range, 0, 0), "No.");
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));

        let title = header_col(&range, "Notice Title");
        assert_eq!(string_at(&range, 1, title), "Radiation survey");
        let budget = header_col(&range, "Allocated Budget (KRW)");
        assert_eq!(range.get_value((1, budget)), Some(&Data::Float(1_000_000.0)));
        let min_bid = header_col(&range, "Expected Minimum Bid (KRW)");
        assert_eq!(range.get_value((1, min_bid)), Some(&Data::Float(877_450.0)));
        let url = header_col(&range, "Notice URL");
        assert_eq!(string_at(&range, 1, url), "https://example.org/notice/1");
    }

    #[test]
    fn non_http_url_column_values_fall_back_to_plain_text() {
        // URL columns only become hyperlinks for http(s) values; anything
        // else is written verbatim as text instead of failing the export.
        let raws = vec![
            bid_record(&[
                ("bidNtceNm", "Notice with attachment note"),
                ("bidNtceDt", "2026-02-01 10:00"),
                ("bidNtceUrl", "see the agency portal"),
            ]),
            bid_record(&[
                ("bidNtceNm", "Notice with real link"),
                ("bidNtceDt", "2026-02-02 10:00"),
                ("bidNtceUrl", "https://example.org/notice/2"),
            ]),
        ];
        let table = normalize(Source::BidNotice, raws, &[], &[]);
        let buffer = build_workbook(&result_with(Source::BidNotice, table), now()).unwrap();

        let range = read_sheet(buffer, Source::BidNotice.sheet_name());
        let url = header_col(&range, "Notice URL");
        assert_eq!(string_at(&range, 1, url), "see the agency portal");
        assert_eq!(string_at(&range, 2, url), "https://example.org/notice/2");
    }
}
