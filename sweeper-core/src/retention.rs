//! Retention rules
//!
//! Decides which pipelines are old enough to delete. Everything here is a pure
//! function of its inputs: the reference instant is passed in by the caller
//! and never read from the system clock, so one filtering pass always uses a
//! single, stable boundary.
//!
//! Days are exact 24-hour spans in UTC. A pipeline is expired when its
//! `updated_at` is strictly earlier than `reference - threshold_days`; a
//! pipeline exactly at the boundary is retained.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::pipeline::Pipeline;

/// Compute the retention boundary for a filtering pass
///
/// Saturates to the earliest representable instant when the subtraction
/// would leave chrono's range, in which case nothing is expired.
pub fn cutoff(reference: DateTime<Utc>, threshold_days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(threshold_days))
        .and_then(|delta| reference.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether a single pipeline falls before the boundary
pub fn is_expired(pipeline: &Pipeline, cutoff: DateTime<Utc>) -> bool {
    pipeline.updated_at < cutoff
}

/// Select the pipelines older than `threshold_days` relative to `reference`
///
/// # Arguments
/// * `records` - The pipelines to filter (left untouched)
/// * `reference` - The instant age is measured from
/// * `threshold_days` - Pipelines older than this many days are selected
///
/// # Returns
/// The expired pipelines, in their original relative order
pub fn select_expired(
    records: &[Pipeline],
    reference: DateTime<Utc>,
    threshold_days: u32,
) -> Vec<Pipeline> {
    let boundary = cutoff(reference, threshold_days);
    records
        .iter()
        .filter(|pipeline| is_expired(pipeline, boundary))
        .cloned()
        .collect()
}

/// Split pipelines into `(expired, retained)`, both in original order
pub fn partition(
    records: &[Pipeline],
    reference: DateTime<Utc>,
    threshold_days: u32,
) -> (Vec<Pipeline>, Vec<Pipeline>) {
    let boundary = cutoff(reference, threshold_days);
    records
        .iter()
        .cloned()
        .partition(|pipeline| is_expired(pipeline, boundary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(id: u64, updated_at: DateTime<Utc>) -> Pipeline {
        Pipeline {
            id,
            updated_at,
            created_at: None,
            status: None,
            git_ref: None,
            sha: None,
            web_url: None,
        }
    }

    fn start_date() -> DateTime<Utc> {
        "2020-10-01T15:12:52.710Z".parse().unwrap()
    }

    /// One pipeline per day, `count` days back from `start`, ids 1..=count
    fn daily_pipelines(start: DateTime<Utc>, count: u64) -> Vec<Pipeline> {
        (1..=count)
            .map(|index| pipeline(index, start - TimeDelta::days(index as i64)))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(select_expired(&[], Utc::now(), 30).is_empty());
        assert!(select_expired(&[], Utc::now(), 0).is_empty());
    }

    #[test]
    fn test_selects_only_older_than_threshold() {
        let pipelines = daily_pipelines(start_date(), 35);

        let expired = select_expired(&pipelines, start_date(), 30);

        let ids: Vec<u64> = expired.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![31, 32, 33, 34, 35]);

        let dates: Vec<String> = expired
            .iter()
            .map(|p| p.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string())
            .collect();
        assert_eq!(
            dates,
            vec![
                "2020-08-31T15:12:52",
                "2020-08-30T15:12:52",
                "2020-08-29T15:12:52",
                "2020-08-28T15:12:52",
                "2020-08-27T15:12:52",
            ]
        );
    }

    #[test]
    fn test_all_younger_than_threshold() {
        let pipelines = daily_pipelines(start_date(), 15);
        assert!(select_expired(&pipelines, start_date(), 30).is_empty());
    }

    #[test]
    fn test_boundary_is_retained() {
        let boundary = start_date() - TimeDelta::days(30);
        let pipelines = vec![
            pipeline(1, boundary),
            pipeline(2, boundary - TimeDelta::microseconds(1)),
            pipeline(3, boundary + TimeDelta::microseconds(1)),
        ];

        let expired = select_expired(&pipelines, start_date(), 30);

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, 2);
    }

    #[test]
    fn test_zero_days_threshold() {
        let now = start_date();
        let pipelines = vec![
            pipeline(1, now),
            pipeline(2, now - TimeDelta::milliseconds(1)),
        ];

        let expired = select_expired(&pipelines, now, 0);

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, 2);
    }

    #[test]
    fn test_reapplying_filter_changes_nothing() {
        let pipelines = daily_pipelines(start_date(), 60);

        let once = select_expired(&pipelines, start_date(), 30);
        let twice = select_expired(&once, start_date(), 30);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_input_order() {
        let now = start_date();
        let pipelines = vec![
            pipeline(5, now - TimeDelta::days(40)),
            pipeline(1, now - TimeDelta::days(2)),
            pipeline(9, now - TimeDelta::days(90)),
            pipeline(3, now - TimeDelta::days(31)),
        ];

        let ids: Vec<u64> = select_expired(&pipelines, now, 30)
            .iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec![5, 9, 3]);
    }

    #[test]
    fn test_partition() {
        let pipelines = daily_pipelines(start_date(), 35);

        let (expired, retained) = partition(&pipelines, start_date(), 30);

        assert_eq!(expired.len(), 5);
        assert_eq!(retained.len(), 30);
        assert_eq!(retained.first().map(|p| p.id), Some(1));
        assert_eq!(retained.last().map(|p| p.id), Some(30));
    }

    #[test]
    fn test_cutoff_saturates() {
        let ancient = DateTime::<Utc>::MIN_UTC + TimeDelta::days(1);
        assert_eq!(cutoff(ancient, u32::MAX), DateTime::<Utc>::MIN_UTC);

        let pipelines = vec![pipeline(1, ancient)];
        assert!(select_expired(&pipelines, ancient, u32::MAX).is_empty());
    }
}
