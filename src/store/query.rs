//! Explicit record filters.
//!
//! Each filter takes the records to narrow down plus its parameters, so callers
//! compose them instead of relying on a store-wide default scope.

use chrono::{DateTime, TimeDelta, Utc};

use crate::tenant::TenantCode;

use super::Record;

pub const RECENT_WINDOW_DAYS: u32 = 30;

pub fn active<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a Record<T>>,
) -> impl Iterator<Item = &'a Record<T>> {
    records.into_iter().filter(|record| record.is_active())
}

pub fn for_tenant<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a Record<T>>,
    tenant: &'a TenantCode,
) -> impl Iterator<Item = &'a Record<T>> {
    records
        .into_iter()
        .filter(move |record| record.tenant() == tenant)
}

pub fn created_since<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a Record<T>>,
    since: DateTime<Utc>,
) -> impl Iterator<Item = &'a Record<T>> {
    records
        .into_iter()
        .filter(move |record| record.created_at() >= since)
}

/// Records created within `window` of `now`, inclusive of the boundary.
///
/// A window reaching past the earliest representable instant keeps every record.
pub fn recent<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a Record<T>>,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> impl Iterator<Item = &'a Record<T>> {
    let since = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    created_since(records, since)
}

pub fn default_recent_window() -> TimeDelta {
    TimeDelta::days(i64::from(RECENT_WINDOW_DAYS))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> Vec<Record<&'static str>> {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let acme = TenantCode::parse("ACME").unwrap();
        let wtn = TenantCode::default();
        let mut closed = Record::new("wtn-agent-cccccc".into(), acme.clone(), "closed", now);
        closed.set_active(false, now);
        vec![
            Record::new("wtn-agent-aaaaaa".into(), acme.clone(), "fresh", now),
            Record::new(
                "wtn-agent-bbbbbb".into(),
                acme,
                "old",
                now - TimeDelta::days(45),
            ),
            closed,
            Record::new(
                "wtn-agent-dddddd".into(),
                wtn,
                "boundary",
                now - TimeDelta::days(30),
            ),
        ]
    }

    fn names<'a>(records: impl Iterator<Item = &'a Record<&'static str>>) -> Vec<&'static str> {
        let mut names: Vec<_> = records.map(|r| *r.data()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn active_skips_deactivated_records() {
        let records = sample();
        assert_eq!(names(active(&records)), ["boundary", "fresh", "old"]);
    }

    #[test]
    fn tenant_scope_is_explicit() {
        let records = sample();
        let acme = TenantCode::parse("ACME").unwrap();
        assert_eq!(names(for_tenant(&records, &acme)), ["closed", "fresh", "old"]);
        let nobody = TenantCode::parse("NOBODY").unwrap();
        assert!(for_tenant(&records, &nobody).next().is_none());
    }

    #[test]
    fn recent_uses_an_inclusive_window() {
        let records = sample();
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(
            names(recent(&records, now, default_recent_window())),
            ["boundary", "closed", "fresh"]
        );
        assert_eq!(
            names(recent(&records, now, TimeDelta::days(1))),
            ["closed", "fresh"]
        );
    }

    #[test]
    fn oversized_window_keeps_everything() {
        let records = sample();
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(
            names(recent(&records, now, TimeDelta::days(200_000_000))),
            ["boundary", "closed", "fresh", "old"]
        );
        assert_eq!(
            names(recent(&records, now, TimeDelta::days(i64::from(u32::MAX)))).len(),
            4
        );
    }

    #[test]
    fn filters_compose() {
        let records = sample();
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let acme = TenantCode::parse("ACME").unwrap();
        let hits = active(for_tenant(
            recent(&records, now, default_recent_window()),
            &acme,
        ));
        assert_eq!(names(hits), ["fresh"]);
    }
}
