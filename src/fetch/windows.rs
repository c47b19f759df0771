// 30-day window driver for the bid-notice feed. The upstream service is
// unreliable for wide date ranges, so the lookback is chunked into fixed
// windows and queried window by window, newest first.
use crate::fetch::client::bid_params;
use crate::fetch::traits::FeedClient;
use crate::model::{FetchOutcome, ProgressObserver, Source};

use chrono::{DateTime, Duration, Local};
use tracing::info;

const WINDOW_DAYS: i64 = 30;
const WINDOW_PAUSE_MS: u64 = 100;

/// Splits a lookback of `months` into 30-day `[begin, end)` windows,
/// most recent first. Window 0 ends at `now`.
pub fn split_windows(now: DateTime<Local>, months: u32) -> Vec<(DateTime<Local>, DateTime<Local>)> {
    (0..months as i64)
        .map(|i| {
            (
                now - Duration::days((i + 1) * WINDOW_DAYS),
                now - Duration::days(i * WINDOW_DAYS),
            )
        })
        .collect()
}

/// Fetches bid notices for every (window, keyword) pair and accumulates the
/// results. Reports progress after each finished window and pauses briefly
/// between windows to keep the upstream happy.
pub async fn fetch_bid_windows(
    client: &dyn FeedClient,
    service_key: &str,
    keywords: &[String],
    months: u32,
    now: DateTime<Local>,
    observer: &dyn ProgressObserver,
) -> FetchOutcome {
    let windows = split_windows(now, months);
    let total = windows.len() as u32;
    let mut items = Vec::new();
    let mut partial = false;

    for (i, (begin, end)) in windows.iter().enumerate() {
        let begin_str = begin.format("%Y%m%d%H%M").to_string();
        let end_str = end.format("%Y%m%d%H%M").to_string();

        for keyword in keywords {
            let params = bid_params(service_key, &begin_str, &end_str, keyword);
            let outcome = client.fetch_all(Source::BidNotice, &params).await;
            partial |= outcome.partial;
            items.extend(outcome.items);
        }

        info!(
            "bid-notice window {}/{} done ({} records so far)",
            i + 1,
            total,
            items.len()
        );
        observer.progress(i as u32 + 1, total);
        tokio::time::sleep(std::time::Duration::from_millis(WINDOW_PAUSE_MS)).await;
    }

    FetchOutcome { items, partial }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_months_make_three_windows() {
        let now = Local::now();
        let windows = split_windows(now, 3);
        assert_eq!(windows.len(), 3);
        for (begin, end) in &windows {
            assert_eq!(*end - *begin, Duration::days(30));
        }
    }

    #[test]
    fn windows_are_anchored_at_now_and_ordered_newest_first() {
        let now = Local::now();
        let windows = split_windows(now, 3);
        assert_eq!(windows[0].1, now);
        assert_eq!(windows[2].0, now - Duration::days(90));
        // Consecutive windows tile the lookback with no gaps.
        assert_eq!(windows[1].1, windows[0].0);
        assert_eq!(windows[2].1, windows[1].0);
    }

    #[test]
    fn zero_months_means_no_windows() {
        assert!(split_windows(Local::now(), 0).is_empty());
    }
}
