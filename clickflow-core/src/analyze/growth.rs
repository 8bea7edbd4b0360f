//! Day-over-day growth ranking.
//!
//! The leaderboard compares each project's clicks today against yesterday,
//! drops projects with zero growth, and ranks the rest by percent change.
//! Rank movement comes from replaying the same ranking over the prior
//! day's counts.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{GrowthSample, ProjectId, RankedProject};

/// Day-over-day percent change, rounded to one decimal.
///
/// Conventions: both zero → 0; growth from zero → 100; otherwise the
/// signed relative change. Rounding is half away from zero.
pub fn percent_change(today: u64, yesterday: u64) -> f64 {
    if yesterday == 0 {
        return if today == 0 { 0.0 } else { 100.0 };
    }
    #[allow(clippy::cast_precision_loss)]
    let raw = (today as f64 - yesterday as f64) / yesterday as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Rank projects by day-over-day growth.
///
/// Projects whose rounded percent is exactly zero are filtered out.
/// Sort order is percent descending with clicks-today as the tiebreak;
/// the sort is stable, so fully tied projects keep input order. Ranks
/// are 1-based. `rank_change` is the number of positions gained since
/// the prior day's ranking, `None` for projects absent from it.
pub fn rank_projects(samples: &[GrowthSample]) -> Vec<RankedProject> {
    let prior = prior_ranks(samples);

    let mut rows: Vec<RankedProject> = samples
        .iter()
        .filter_map(|sample| {
            let percent = percent_change(sample.clicks_today, sample.clicks_yesterday);
            if percent == 0.0 {
                return None;
            }
            Some(RankedProject {
                project_id: sample.project_id,
                percent,
                clicks_today: sample.clicks_today,
                clicks_yesterday: sample.clicks_yesterday,
                rank: 0, // Assigned after sorting
                rank_change: None,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.percent
            .total_cmp(&a.percent)
            .then(b.clicks_today.cmp(&a.clicks_today))
    });

    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx as u64 + 1;
        #[allow(clippy::cast_possible_wrap)]
        if let Some(&prior_rank) = prior.get(&row.project_id) {
            row.rank_change = Some(prior_rank as i64 - row.rank as i64);
        }
    }

    debug!(
        ranked = rows.len(),
        filtered = samples.len() - rows.len(),
        "Ranked projects by growth"
    );
    rows
}

/// A project's 1-based position in the leaderboard, `None` if filtered out.
pub fn trending_rank(project_id: ProjectId, ranked: &[RankedProject]) -> Option<u64> {
    ranked
        .iter()
        .find(|row| row.project_id == project_id)
        .map(|row| row.rank)
}

/// Replay the ranking over (yesterday, day-before) counts.
///
/// Samples without a day-before baseline never enter the prior ranking,
/// so their rank movement stays `None`.
fn prior_ranks(samples: &[GrowthSample]) -> HashMap<ProjectId, u64> {
    let mut rows: Vec<(ProjectId, f64, u64)> = samples
        .iter()
        .filter_map(|sample| {
            let day_before = sample.clicks_day_before?;
            let percent = percent_change(sample.clicks_yesterday, day_before);
            if percent == 0.0 {
                return None;
            }
            Some((sample.project_id, percent, sample.clicks_yesterday))
        })
        .collect();

    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.2.cmp(&a.2)));
    rows.iter()
        .enumerate()
        .map(|(idx, (id, _, _))| (*id, idx as u64 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(
        today: u64,
        yesterday: u64,
        day_before: Option<u64>,
    ) -> GrowthSample {
        GrowthSample {
            project_id: ProjectId::new(),
            clicks_today: today,
            clicks_yesterday: yesterday,
            clicks_day_before: day_before,
        }
    }

    #[test]
    fn percent_zero_conventions() {
        assert_eq!(percent_change(0, 0), 0.0);
        assert_eq!(percent_change(7, 0), 100.0);
        assert_eq!(percent_change(0, 4), -100.0);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent_change(150, 100), 50.0);
        assert_eq!(percent_change(1, 3), -66.7);
        assert_eq!(percent_change(2, 3), -33.3);
    }

    #[test]
    fn percent_rounds_halves_away_from_zero() {
        // 15/16 and 17/16 are exact in binary, so the scaled value lands
        // on precisely ±62.5 before rounding.
        assert_eq!(percent_change(17, 16), 6.3);
        assert_eq!(percent_change(15, 16), -6.3);
    }

    #[test]
    fn zero_growth_projects_filtered() {
        let samples = vec![
            sample(10, 10, None), // 0% — dropped
            sample(0, 0, None),   // 0% — dropped
            sample(20, 10, None),
        ];
        let ranked = rank_projects(&samples);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].percent, 100.0);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn sorted_by_percent_then_clicks_today() {
        let samples = vec![
            sample(15, 10, None), // +50%
            sample(40, 20, None), // +100%, 40 today
            sample(20, 10, None), // +100%, 20 today
            sample(5, 10, None),  // -50%
        ];
        let ranked = rank_projects(&samples);
        let today: Vec<u64> = ranked.iter().map(|r| r.clicks_today).collect();
        assert_eq!(today, vec![40, 20, 15, 5]);
        let ranks: Vec<u64> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn negative_growth_still_ranked() {
        let samples = vec![sample(5, 10, None)];
        let ranked = rank_projects(&samples);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].percent, -50.0);
    }

    #[test]
    fn rank_change_against_prior_day() {
        // Prior day (yesterday vs. day-before): a +100%, b +25% → a 1st, b 2nd.
        // Today: b +200%, a +25% → b 1st, a 2nd.
        let a = sample(25, 20, Some(10));
        let b = sample(30, 10, Some(8));
        let ranked = rank_projects(&[a.clone(), b.clone()]);

        let row_b = ranked.iter().find(|r| r.project_id == b.project_id).unwrap();
        let row_a = ranked.iter().find(|r| r.project_id == a.project_id).unwrap();
        assert_eq!(row_b.rank, 1);
        assert_eq!(row_a.rank, 2);
        // b climbed from 2nd to 1st; a dropped from 1st to 2nd.
        assert_eq!(row_b.rank_change, Some(1));
        assert_eq!(row_a.rank_change, Some(-1));
    }

    #[test]
    fn rank_change_none_for_new_entrants() {
        let newcomer = sample(10, 5, None);
        let steady = sample(30, 20, Some(10));
        let ranked = rank_projects(&[newcomer.clone(), steady.clone()]);

        let row_new = ranked
            .iter()
            .find(|r| r.project_id == newcomer.project_id)
            .unwrap();
        assert_eq!(row_new.rank_change, None);

        let row_steady = ranked
            .iter()
            .find(|r| r.project_id == steady.project_id)
            .unwrap();
        assert!(row_steady.rank_change.is_some());
    }

    #[test]
    fn rank_change_none_when_filtered_from_prior() {
        // Flat yesterday vs. day-before → absent from the prior ranking,
        // even though the baseline count exists.
        let samples = vec![sample(20, 10, Some(10))];
        let ranked = rank_projects(&samples);
        assert_eq!(ranked[0].rank_change, None);
    }

    #[test]
    fn rank_change_zero_when_position_held() {
        let samples = vec![sample(40, 20, Some(10))];
        let ranked = rank_projects(&samples);
        assert_eq!(ranked[0].rank_change, Some(0));
    }

    #[test]
    fn trending_rank_lookup() {
        let hot = sample(20, 10, None);
        let flat = sample(10, 10, None);
        let ranked = rank_projects(&[hot.clone(), flat.clone()]);

        assert_eq!(trending_rank(hot.project_id, &ranked), Some(1));
        assert_eq!(trending_rank(flat.project_id, &ranked), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_sample() -> impl Strategy<Value = GrowthSample> {
            (0u64..10_000, 0u64..10_000, proptest::option::of(0u64..10_000)).prop_map(
                |(today, yesterday, day_before)| sample(today, yesterday, day_before),
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn percent_is_finite_and_one_decimal(today in 0u64..1_000_000, yesterday in 0u64..1_000_000) {
                let p = percent_change(today, yesterday);
                prop_assert!(p.is_finite());
                // One decimal place: scaling by 10 is an integer up to
                // float noise from the final division.
                prop_assert!((p * 10.0 - (p * 10.0).round()).abs() < 1e-6);
            }

            #[test]
            fn ranks_are_contiguous_and_sorted(samples in proptest::collection::vec(arb_sample(), 0..30)) {
                let ranked = rank_projects(&samples);
                for (idx, row) in ranked.iter().enumerate() {
                    prop_assert_eq!(row.rank, idx as u64 + 1);
                    prop_assert!(row.percent != 0.0);
                }
                for pair in ranked.windows(2) {
                    prop_assert!(pair[0].percent >= pair[1].percent);
                    if pair[0].percent == pair[1].percent {
                        prop_assert!(pair[0].clicks_today >= pair[1].clicks_today);
                    }
                }
            }
        }
    }
}
