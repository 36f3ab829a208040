use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::models::settings::BusinessSettings;

/// Weekly opening rules plus the business clock. Borrowed from a freshly
/// loaded settings snapshot, so one resolution sees one consistent config.
pub struct BusinessCalendar<'a> {
    settings: &'a BusinessSettings,
    tz: Tz,
}

impl<'a> BusinessCalendar<'a> {
    pub fn new(settings: &'a BusinessSettings) -> Self {
        let tz: Tz = settings.timezone.parse().unwrap_or(chrono_tz::UTC);
        Self { settings, tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// 0 = Sunday .. 6 = Saturday, matching the stored rule rows.
    pub fn weekday_index(date: NaiveDate) -> i32 {
        date.weekday().num_days_from_sunday() as i32
    }

    /// Calendar date in the business timezone at the given instant.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Wall-clock time in the business timezone at the given instant.
    pub fn time_at(&self, now: DateTime<Utc>) -> NaiveTime {
        now.with_timezone(&self.tz).time()
    }

    /// Open on this weekday? A missing rule counts as open so a half
    /// configured business still shows dates; without hours no slots can
    /// be generated anyway.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        match self.settings.rule_for_weekday(Self::weekday_index(date)) {
            Some(rule) => rule.is_open,
            None => true,
        }
    }

    /// Opening window for the date; None when closed or unconfigured.
    pub fn hours_for(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        let rule = self.settings.rule_for_weekday(Self::weekday_index(date))?;
        if !rule.is_open {
            return None;
        }
        Some((rule.open_time, rule.close_time))
    }

    /// Booking floor: dates before it are never offered.
    pub fn is_bookable(&self, date: NaiveDate) -> bool {
        match self.settings.booking_floor_date {
            Some(floor) => date >= floor,
            None => true,
        }
    }

    /// Business-timezone wall clock to instant. Ambiguous times (DST fall
    /// back) take the earlier reading; nonexistent times (DST gap) fall back
    /// to the UTC reading of the same wall clock.
    pub fn wall_to_utc(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }

    /// Instant to business-timezone wall clock.
    pub fn utc_to_wall(&self, at: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
        let local = at.with_timezone(&self.tz);
        (local.date_naive(), local.time())
    }

    /// UTC window covering the date's local midnight-to-midnight, used to
    /// query the external calendar for events touching the date.
    pub fn day_window_utc(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.wall_to_utc(date, NaiveTime::MIN);
        let end = self.wall_to_utc(date + chrono::Duration::days(1), NaiveTime::MIN);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::settings::BusinessHourRule;

    fn settings(tz: &str) -> BusinessSettings {
        BusinessSettings {
            timezone: tz.to_string(),
            buffer_min: 0,
            booking_floor_date: None,
            waitlist_enabled: true,
            hours: vec![
                BusinessHourRule {
                    weekday: 0,
                    is_open: false,
                    open_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    close_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                },
                BusinessHourRule {
                    weekday: 5,
                    is_open: true,
                    open_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    close_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                },
            ],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_index_is_sunday_based() {
        assert_eq!(BusinessCalendar::weekday_index(date(2025, 10, 10)), 5, "2025-10-10 is a Friday");
        assert_eq!(BusinessCalendar::weekday_index(date(2025, 10, 12)), 0, "2025-10-12 is a Sunday");
    }

    #[test]
    fn test_open_day_has_hours() {
        let s = settings("UTC");
        let cal = BusinessCalendar::new(&s);
        let friday = date(2025, 10, 10);
        assert!(cal.is_business_day(friday));
        assert_eq!(
            cal.hours_for(friday),
            Some((NaiveTime::from_hms_opt(10, 0, 0).unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_closed_day_has_no_hours() {
        let s = settings("UTC");
        let cal = BusinessCalendar::new(&s);
        let sunday = date(2025, 10, 12);
        assert!(!cal.is_business_day(sunday));
        assert_eq!(cal.hours_for(sunday), None);
    }

    #[test]
    fn test_missing_rule_counts_open_but_yields_no_hours() {
        let s = settings("UTC");
        let cal = BusinessCalendar::new(&s);
        let monday = date(2025, 10, 13);
        assert!(cal.is_business_day(monday));
        assert_eq!(cal.hours_for(monday), None);
    }

    #[test]
    fn test_booking_floor() {
        let mut s = settings("UTC");
        s.booking_floor_date = Some(date(2030, 1, 15));
        let cal = BusinessCalendar::new(&s);
        assert!(!cal.is_bookable(date(2030, 1, 14)));
        assert!(cal.is_bookable(date(2030, 1, 15)), "Floor date itself is bookable");
        assert!(cal.is_bookable(date(2030, 1, 16)));

        let s = settings("UTC");
        let cal = BusinessCalendar::new(&s);
        assert!(cal.is_bookable(date(2020, 1, 1)), "No floor means no cutoff");
    }

    #[test]
    fn test_wall_to_utc_and_back() {
        let s = settings("America/Los_Angeles");
        let cal = BusinessCalendar::new(&s);
        let at = cal.wall_to_utc(date(2030, 1, 15), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(at, Utc.with_ymd_and_hms(2030, 1, 15, 18, 0, 0).unwrap(), "PST is UTC-8");
        assert_eq!(
            cal.utc_to_wall(at),
            (date(2030, 1, 15), NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_wall_to_utc_skipped_hour_falls_back() {
        // 02:30 does not exist in Los Angeles on 2030-03-10; the clock jumps
        // from 02:00 to 03:00.
        let s = settings("America/Los_Angeles");
        let cal = BusinessCalendar::new(&s);
        let at = cal.wall_to_utc(date(2030, 3, 10), NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        assert_eq!(at, Utc.with_ymd_and_hms(2030, 3, 10, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_today_at_crosses_date_line() {
        let s = settings("Pacific/Auckland");
        let cal = BusinessCalendar::new(&s);
        let at = Utc.with_ymd_and_hms(2030, 1, 15, 20, 0, 0).unwrap();
        assert_eq!(cal.today_at(at), date(2030, 1, 16), "NZDT is UTC+13");
    }

    #[test]
    fn test_unparseable_timezone_falls_back_to_utc() {
        let s = settings("Not/A_Zone");
        let cal = BusinessCalendar::new(&s);
        assert_eq!(cal.tz(), chrono_tz::UTC);
    }

    #[test]
    fn test_day_window_covers_local_day() {
        let s = settings("America/Los_Angeles");
        let cal = BusinessCalendar::new(&s);
        let (start, end) = cal.day_window_utc(date(2030, 1, 15));
        assert_eq!(start, Utc.with_ymd_and_hms(2030, 1, 15, 8, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2030, 1, 16, 8, 0, 0).unwrap());
    }
}
