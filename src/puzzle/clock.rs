use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Source of "today" for date-relative queries
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock read in a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock in a whole-hour offset; out-of-range hours fall back to UTC
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_hours(-5)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
