//! Per-project insight summaries: top page, top referrer, daily series.

use std::collections::BTreeMap;
use std::collections::HashMap;

use clickflow_graphs::{NormalizedUrl, normalize};

use super::growth::percent_change;
use crate::types::{DailyClicks, PageVisit, Trend};

/// Referrer bucket for visits that arrived without one.
pub const DIRECT_REFERRER: &str = "direct";

/// The most-visited page by normalized URL, with its count.
///
/// Ties go to the page seen first in the visit slice.
pub fn top_page(visits: &[PageVisit]) -> Option<(NormalizedUrl, u64)> {
    let mut counts: HashMap<NormalizedUrl, u64> = HashMap::new();
    let mut order: Vec<NormalizedUrl> = Vec::new();
    for visit in visits {
        let key = normalize(&visit.url);
        if !counts.contains_key(&key) {
            order.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut best: Option<(NormalizedUrl, u64)> = None;
    for key in order {
        let count = counts[&key];
        if best.as_ref().is_none_or(|(_, b)| count > *b) {
            best = Some((key, count));
        }
    }
    best
}

/// The most common raw referrer, with missing referrers pooled into the
/// [`DIRECT_REFERRER`] bucket. Ties go to the referrer seen first.
pub fn top_referrer(visits: &[PageVisit]) -> Option<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for visit in visits {
        let key = visit.referrer.as_deref().unwrap_or(DIRECT_REFERRER);
        if !counts.contains_key(key) {
            order.push(key);
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut best: Option<(&str, u64)> = None;
    for key in order {
        let count = counts[key];
        if best.is_none_or(|(_, b)| count > b) {
            best = Some((key, count));
        }
    }
    best.map(|(key, count)| (key.to_string(), count))
}

/// Visits bucketed per UTC calendar date, ascending.
pub fn daily_series(visits: &[PageVisit]) -> Vec<DailyClicks> {
    let mut buckets: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
    for visit in visits {
        *buckets.entry(visit.visited_at.date_naive()).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(date, clicks)| DailyClicks { date, clicks })
        .collect()
}

/// Direction of the last two daily buckets. Fewer than two days → flat.
pub fn trend(series: &[DailyClicks]) -> Trend {
    let [.., prev, last] = series else {
        return Trend::Flat;
    };
    match last.clicks.cmp(&prev.clicks) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Flat,
    }
}

/// Day-over-day percent change of the last two buckets.
pub fn daily_change(series: &[DailyClicks]) -> f64 {
    let [.., prev, last] = series else {
        return 0.0;
    };
    percent_change(last.clicks, prev.clicks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectId, VisitId};
    use chrono::{Datelike, TimeZone, Utc};

    fn visit(url: &str, referrer: Option<&str>, day: u32) -> PageVisit {
        PageVisit {
            id: VisitId(0),
            project_id: ProjectId::new(),
            url: url.to_string(),
            referrer: referrer.map(str::to_string),
            user_agent: None,
            visited_at: Utc.with_ymd_and_hms(2026, 6, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn top_page_merges_normalized_variants() {
        let visits = vec![
            visit("/Docs/", None, 1),
            visit("/docs", None, 1),
            visit("/pricing", None, 1),
        ];
        let (page, count) = top_page(&visits).unwrap();
        assert_eq!(page.as_str(), "/docs");
        assert_eq!(count, 2);
    }

    #[test]
    fn top_page_empty_input() {
        assert!(top_page(&[]).is_none());
    }

    #[test]
    fn top_referrer_buckets_direct() {
        let visits = vec![
            visit("/a", None, 1),
            visit("/b", None, 1),
            visit("/c", Some("https://google.com/"), 1),
        ];
        let (referrer, count) = top_referrer(&visits).unwrap();
        assert_eq!(referrer, DIRECT_REFERRER);
        assert_eq!(count, 2);
    }

    #[test]
    fn top_referrer_prefers_first_seen_on_tie() {
        let visits = vec![
            visit("/a", Some("https://news.ycombinator.com/"), 1),
            visit("/b", Some("https://google.com/"), 1),
        ];
        let (referrer, _) = top_referrer(&visits).unwrap();
        assert_eq!(referrer, "https://news.ycombinator.com/");
    }

    #[test]
    fn daily_series_ascending_and_conserving() {
        let visits = vec![
            visit("/a", None, 3),
            visit("/b", None, 1),
            visit("/c", None, 3),
            visit("/d", None, 2),
        ];
        let series = daily_series(&visits);

        let dates: Vec<u32> = series.iter().map(|d| d.date.day()).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(
            series.iter().map(|d| d.clicks).sum::<u64>(),
            visits.len() as u64
        );
    }

    #[test]
    fn trend_compares_last_two_days() {
        let series = daily_series(&[
            visit("/a", None, 1),
            visit("/b", None, 2),
            visit("/c", None, 2),
        ]);
        assert_eq!(trend(&series), Trend::Up);
        assert_eq!(daily_change(&series), 100.0);

        let falling = daily_series(&[
            visit("/a", None, 1),
            visit("/b", None, 1),
            visit("/c", None, 2),
        ]);
        assert_eq!(trend(&falling), Trend::Down);
        assert_eq!(daily_change(&falling), -50.0);
    }

    #[test]
    fn single_day_is_flat() {
        let series = daily_series(&[visit("/a", None, 1)]);
        assert_eq!(trend(&series), Trend::Flat);
        assert_eq!(daily_change(&series), 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn series_sorted_and_sums_to_visits(days in proptest::collection::vec(1u32..29, 0..50)) {
                let visits: Vec<PageVisit> =
                    days.iter().map(|&d| visit("/p", None, d)).collect();
                let series = daily_series(&visits);

                for pair in series.windows(2) {
                    prop_assert!(pair[0].date < pair[1].date);
                }
                prop_assert_eq!(
                    series.iter().map(|d| d.clicks).sum::<u64>(),
                    visits.len() as u64
                );
            }
        }
    }
}
