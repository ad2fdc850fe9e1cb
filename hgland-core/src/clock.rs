//! Simulation calendar
//!
//! Binary punch files tag every record with `tau`, the number of hours since
//! 1985-01-01 00:00 UTC. [`ModelClock`] tracks the current model time, the
//! emission timestep and whether a new calendar month has started.

use crate::errors::{HgError, HgResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Reference year of the monthly climatologies
pub const CLIMATOLOGY_YEAR: i32 = 1985;

fn tau_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1985, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Hours since 1985-01-01 00:00
pub fn tau_hours(time: NaiveDateTime) -> f64 {
    (time - tau_epoch()).num_seconds() as f64 / 3600.0
}

/// `tau` at 00:00 on the first day of `month` in `year`
pub fn tau_month_start(year: i32, month: u32) -> HgResult<f64> {
    let start = first_of_month(year, month)?;
    Ok(tau_hours(start))
}

/// Number of days in `month` of `year`
pub fn days_in_month(year: i32, month: u32) -> HgResult<u32> {
    let start = first_of_month(year, month)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = first_of_month(next_year, next_month)?;
    Ok((next - start).num_days() as u32)
}

fn first_of_month(year: i32, month: u32) -> HgResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| HgError::Error(format!("Invalid calendar month {}-{}", year, month)))
}

/// Model time and emission timestep
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelClock {
    current: NaiveDateTime,
    /// Emission timestep
    /// unit: s
    timestep_seconds: f64,
    /// Month of the previous timestep, `None` before the first step
    previous_month: Option<u32>,
}

impl ModelClock {
    pub fn new(start: NaiveDateTime, timestep_seconds: f64) -> HgResult<Self> {
        if !(timestep_seconds > 0.0) {
            return Err(HgError::Config(format!(
                "Timestep must be positive, got {} s",
                timestep_seconds
            )));
        }
        Ok(Self {
            current: start,
            timestep_seconds,
            previous_month: None,
        })
    }

    pub fn current(&self) -> NaiveDateTime {
        self.current
    }

    pub fn year(&self) -> i32 {
        self.current.year()
    }

    pub fn month(&self) -> u32 {
        self.current.month()
    }

    pub fn timestep_seconds(&self) -> f64 {
        self.timestep_seconds
    }

    pub fn tau(&self) -> f64 {
        tau_hours(self.current)
    }

    /// True on the first timestep and on the first timestep of every month
    pub fn is_new_month(&self) -> bool {
        self.previous_month != Some(self.month())
    }

    /// Year and month of the calendar month before the current one
    pub fn previous_calendar_month(&self) -> (i32, u32) {
        match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        }
    }

    /// Move forward by one timestep
    pub fn advance(&mut self) {
        self.previous_month = Some(self.month());
        let step = Duration::milliseconds((self.timestep_seconds * 1000.0).round() as i64);
        self.current += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_tau_epoch() {
        assert_eq!(tau_hours(at(1985, 1, 1, 0)), 0.0);
        assert_eq!(tau_hours(at(1985, 1, 2, 6)), 30.0);
        assert_eq!(tau_hours(at(1984, 12, 31, 0)), -24.0);
    }

    #[test]
    fn test_tau_month_start() {
        assert_eq!(tau_month_start(1985, 1).unwrap(), 0.0);
        assert_eq!(tau_month_start(1985, 2).unwrap(), 744.0);
        assert_eq!(tau_month_start(1985, 3).unwrap(), 744.0 + 672.0);
        assert!(tau_month_start(1985, 13).is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2008, 2).unwrap(), 29);
        assert_eq!(days_in_month(2009, 2).unwrap(), 28);
        assert_eq!(days_in_month(2009, 12).unwrap(), 31);
    }

    #[test]
    fn test_rejects_non_positive_timestep() {
        assert!(ModelClock::new(at(2009, 1, 1, 0), 0.0).is_err());
        assert!(ModelClock::new(at(2009, 1, 1, 0), f64::NAN).is_err());
    }

    #[test]
    fn test_new_month_detection() {
        let mut clock = ModelClock::new(at(2009, 1, 31, 22), 3600.0).unwrap();
        assert!(clock.is_new_month(), "first step starts a month");

        clock.advance();
        assert_eq!(clock.current(), at(2009, 1, 31, 23));
        assert!(!clock.is_new_month());

        clock.advance();
        assert_eq!(clock.month(), 2);
        assert!(clock.is_new_month());

        clock.advance();
        assert!(!clock.is_new_month());
    }

    #[test]
    fn test_previous_calendar_month() {
        let clock = ModelClock::new(at(2009, 1, 15, 0), 3600.0).unwrap();
        assert_eq!(clock.previous_calendar_month(), (2008, 12));
        let clock = ModelClock::new(at(2009, 7, 15, 0), 3600.0).unwrap();
        assert_eq!(clock.previous_calendar_month(), (2009, 6));
    }
}
