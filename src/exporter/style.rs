// Static per-sheet styling rules plus the urgency and width calculations.
use crate::model::Source;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub struct SheetStyleRule {
    /// Left-aligned columns; these are also the "wide" title-ish columns
    /// that get the larger width margin.
    pub left: &'static [&'static str],
    pub right: &'static [&'static str],
    pub custom_widths: &'static [(&'static str, f64)],
    pub url_columns: &'static [&'static str],
    pub deadline_column: Option<&'static str>,
}

const ORDER_PLAN_STYLE: SheetStyleRule = SheetStyleRule {
    left: &["Project Name", "Ordering Agency"],
    right: &["Total Order Amount (KRW)"],
    custom_widths: &[("Project Name", 60.0)],
    url_columns: &[],
    deadline_column: None,
};

const PRIOR_SPEC_STYLE: SheetStyleRule = SheetStyleRule {
    left: &["Product Name", "Ordering Agency", "Demand Agency"],
    right: &["Allocated Budget (KRW)"],
    custom_widths: &[("Product Name", 60.0)],
    url_columns: &["Spec Document URL"],
    deadline_column: None,
};

const BID_NOTICE_STYLE: SheetStyleRule = SheetStyleRule {
    left: &["Notice Title", "Notice Agency", "Demand Agency"],
    right: &[
        "Allocated Budget (KRW)",
        "Estimated Price (KRW)",
        "Participation Fee (KRW)",
        "Expected Minimum Bid (KRW)",
    ],
    custom_widths: &[("Notice Title", 60.0), ("Opening Place", 32.0)],
    url_columns: &["Notice URL"],
    deadline_column: Some("Bid Close At"),
};

const RD_NOTICE_STYLE: SheetStyleRule = SheetStyleRule {
    left: &["Notice Title", "Agency"],
    right: &[],
    custom_widths: &[("Notice Title", 60.0)],
    url_columns: &["Notice URL"],
    deadline_column: None,
};

pub fn style_rule(source: Source) -> &'static SheetStyleRule {
    match source {
        Source::OrderPlan => &ORDER_PLAN_STYLE,
        Source::PriorSpec => &PRIOR_SPEC_STYLE,
        Source::BidNotice => &BID_NOTICE_STYLE,
        Source::RdNotice => &RD_NOTICE_STYLE,
    }
}

/// A deadline is urgent when it lies strictly in the future and no more
/// than 7 days (inclusive) ahead. Unparseable values are never urgent.
pub fn is_urgent(deadline: &str, now: NaiveDateTime) -> bool {
    match parse_deadline(deadline) {
        Some(deadline) => deadline > now && deadline - now <= Duration::days(7),
        None => false,
    }
}

fn parse_deadline(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y%m%d%H%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Computed column width: content length plus a margin, scaled, capped.
/// Wide (title) columns get the larger margin and scale.
pub fn column_width(max_len: usize, wide: bool) -> f64 {
    let width = if wide {
        (max_len as f64 + 7.0) * 1.4
    } else {
        (max_len as f64 + 5.0) * 1.3
    };
    width.min(120.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn deadline_exactly_seven_days_out_is_urgent() {
        assert!(is_urgent("2026-02-17 09:30:00", now()));
    }

    #[test]
    fn deadline_past_the_seven_day_boundary_is_not_urgent() {
        assert!(!is_urgent("2026-02-17 09:30:01", now()));
    }

    #[test]
    fn past_deadline_is_never_urgent() {
        assert!(!is_urgent("2026-02-09 09:30:00", now()));
        assert!(!is_urgent("2026-02-10 09:30:00", now()));
    }

    #[test]
    fn tomorrow_is_urgent_in_every_supported_format() {
        assert!(is_urgent("2026-02-11 08:00", now()));
        assert!(is_urgent("2026/02/11 08:00", now()));
        assert!(is_urgent("202602110800", now()));
        assert!(is_urgent("2026-02-11", now()));
    }

    #[test]
    fn garbage_deadline_is_not_urgent() {
        assert!(!is_urgent("", now()));
        assert!(!is_urgent("TBD", now()));
    }

    #[test]
    fn width_is_capped() {
        assert_eq!(column_width(500, true), 120.0);
        assert_eq!(column_width(500, false), 120.0);
    }

    #[test]
    fn wide_columns_get_the_larger_margin() {
        assert!(column_width(10, true) > column_width(10, false));
        assert!((column_width(10, false) - 19.5).abs() < 1e-9);
    }
}
