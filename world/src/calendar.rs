//! In-game calendar and the per-day economic ledger.

use std::collections::VecDeque;

use arcade_manager_core::{CabinetId, Date, DayLedger, Money, Month, DAYS_PER_YEAR};

/// Number of closed ledgers retained for reporting.
pub const LEDGER_HISTORY_DAYS: usize = 30;

/// Derives the calendar date for an absolute day counter.
///
/// Negative counters roll backwards into earlier years.
#[must_use]
pub fn date_for(absolute_day: i64) -> Date {
    let year = absolute_day.div_euclid(DAYS_PER_YEAR);
    let mut remaining = absolute_day.rem_euclid(DAYS_PER_YEAR);
    let mut month = Month::Jan;
    for candidate in Month::ALL {
        month = candidate;
        let length = i64::from(candidate.days());
        if remaining < length {
            break;
        }
        remaining -= length;
    }
    Date {
        absolute_day,
        year,
        month,
        day: u8::try_from(remaining + 1).unwrap_or(u8::MAX),
    }
}

/// Zero-based weekday of an absolute day, Monday being 0.
#[must_use]
pub fn weekday(absolute_day: i64) -> u8 {
    u8::try_from(absolute_day.rem_euclid(7)).unwrap_or(0)
}

/// Weekday on which the first day of the provided month falls.
#[must_use]
pub fn first_weekday_of_month(year: i64, month: Month) -> u8 {
    weekday(year * DAYS_PER_YEAR + i64::from(month.days_before()))
}

/// Tracks the current date, the current ledger, and a bounded ledger history.
#[derive(Clone, Debug)]
pub struct EconomyCalendar {
    date: Date,
    ledger: DayLedger,
    history: VecDeque<DayLedger>,
}

impl EconomyCalendar {
    /// Creates a calendar positioned at the provided absolute day.
    #[must_use]
    pub fn new(absolute_day: i64) -> Self {
        let date = date_for(absolute_day);
        Self {
            date,
            ledger: DayLedger::new(date),
            history: VecDeque::with_capacity(LEDGER_HISTORY_DAYS),
        }
    }

    /// Current date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Ledger collecting today's transactions.
    #[must_use]
    pub const fn ledger(&self) -> &DayLedger {
        &self.ledger
    }

    /// Closed ledgers from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = &DayLedger> {
        self.history.iter()
    }

    /// Moves the date by `days`, which may be negative.
    pub fn advance(&mut self, days: i64) {
        self.date = date_for(self.date.absolute_day + days);
    }

    /// Books a transaction into today's ledger.
    pub fn record_transaction(&mut self, cabinet: Option<CabinetId>, amount: Money) {
        self.ledger.record(cabinet, amount);
    }

    /// Counts a customer admitted through the door.
    pub fn record_visitor(&mut self) {
        self.ledger.visitors = self.ledger.visitors.saturating_add(1);
    }

    /// Counts a game played on any cabinet.
    pub fn record_play(&mut self) {
        self.ledger.plays = self.ledger.plays.saturating_add(1);
    }

    /// Archives today's ledger and starts a fresh one on the following day.
    pub fn roll_day(&mut self) {
        self.advance(1);
        let finished = std::mem::replace(&mut self.ledger, DayLedger::new(self.date));
        if self.history.len() == LEDGER_HISTORY_DAYS {
            let _ = self.history.pop_front();
        }
        self.history.push_back(finished);
    }
}

impl Default for EconomyCalendar {
    fn default() -> Self {
        Self::new(0)
    }
}
