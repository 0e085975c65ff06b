use chrono::NaiveDate;
use std::fmt;

/// Inclusive span of event dates covered by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "date range start after end");
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Widen the range so it includes `date`.
    pub fn include(&mut self, date: NaiveDate) {
        if date < self.start {
            self.start = date;
        }
        if date > self.end {
            self.end = date;
        }
    }

    /// True when both ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start.max(other.start) <= self.end.min(other.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_include_widens_both_ends() {
        let mut range = DateRange::single(d(2021, 6, 15));
        range.include(d(2021, 7, 1));
        range.include(d(2021, 6, 1));
        range.include(d(2021, 6, 20));
        assert_eq!(range, DateRange::new(d(2021, 6, 1), d(2021, 7, 1)));
    }

    #[test]
    fn test_overlap_on_single_shared_day() {
        let a = DateRange::new(d(2021, 1, 1), d(2021, 3, 1));
        let b = DateRange::new(d(2021, 3, 1), d(2021, 5, 1));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let a = DateRange::new(d(2021, 1, 1), d(2021, 3, 1));
        let b = DateRange::new(d(2021, 3, 2), d(2021, 5, 1));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_nested_range_overlaps() {
        let outer = DateRange::new(d(2021, 6, 1), d(2021, 7, 1));
        let inner = DateRange::single(d(2021, 6, 15));
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(d(2021, 6, 1), d(2021, 7, 1));
        assert_eq!(range.to_string(), "[2021-06-01, 2021-07-01]");
    }
}
