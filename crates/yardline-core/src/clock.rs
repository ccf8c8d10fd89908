//! Wall-clock source for "today".
//!
//! Only the schedule confirmation toggle cares what day it is. Tests pin
//! the day with [`Clock::Fixed`]; the server runs on [`Clock::System`].

use chrono::Datelike;
use yardline_types::BackendDay;

/// Source of the current day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Local wall-clock time of the server.
    #[default]
    System,
    /// Always reports the given day.
    Fixed(BackendDay),
}

impl Clock {
    /// Today's day of week in storage order.
    pub fn today(self) -> BackendDay {
        match self {
            Self::System => chrono::Local::now().weekday().into(),
            Self::Fixed(day) => day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_day() {
        assert_eq!(Clock::Fixed(BackendDay::Friday).today(), BackendDay::Friday);
    }
}
