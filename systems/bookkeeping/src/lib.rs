#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic bookkeeping system that turns closed day ledgers into
//! published day reports.

use std::collections::VecDeque;

use arcade_manager_core::{CabinetId, DayLedger, DayReport, Event, Money};

/// Number of closed days the trailing income average covers by default.
pub const DEFAULT_TRAILING_DAYS: usize = 7;

/// Pure bookkeeping system that publishes one report per closed day.
#[derive(Debug)]
pub struct Bookkeeping {
    trailing_days: usize,
    trailing_income: VecDeque<Money>,
    last_report: Option<DayReport>,
}

impl Bookkeeping {
    /// Creates a bookkeeping system averaging income over the default window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_trailing_days(DEFAULT_TRAILING_DAYS)
    }

    /// Creates a bookkeeping system averaging income over `days` closed days.
    #[must_use]
    pub fn with_trailing_days(days: usize) -> Self {
        let trailing_days = days.max(1);
        Self {
            trailing_days,
            trailing_income: VecDeque::with_capacity(trailing_days),
            last_report: None,
        }
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&DayReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and publishes a report for every closed day.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            if let Event::DayClosed { ledger } = event {
                let report = self.summarize(ledger);
                self.last_report = Some(report.clone());
                out.push(Event::DayReportPublished { report });
            }
        }
    }

    fn summarize(&mut self, ledger: &DayLedger) -> DayReport {
        if self.trailing_income.len() == self.trailing_days {
            let _ = self.trailing_income.pop_front();
        }
        self.trailing_income.push_back(ledger.income);

        DayReport {
            date: ledger.date,
            income: ledger.income,
            expenses: ledger.expenses,
            net: ledger.net(),
            visitors: ledger.visitors,
            plays: ledger.plays,
            top_cabinet: top_cabinet(ledger),
            trailing_average_income: self.trailing_average(),
        }
    }

    fn trailing_average(&self) -> Money {
        let days = i64::try_from(self.trailing_income.len()).unwrap_or(1).max(1);
        let total = self
            .trailing_income
            .iter()
            .fold(Money::ZERO, |total, income| total + *income);
        Money::from_cents(total.cents() / days)
    }
}

impl Default for Bookkeeping {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest-earning cabinet of the day; ties go to the lowest id.
fn top_cabinet(ledger: &DayLedger) -> Option<(CabinetId, Money)> {
    ledger
        .income_per_cabinet
        .iter()
        .filter(|(_, income)| income.is_positive())
        .fold(None, |best: Option<(CabinetId, Money)>, (id, income)| match best {
            Some((_, top)) if top >= *income => best,
            _ => Some((*id, *income)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_manager_core::{Date, Month};

    fn ledger(day: i64, earnings: &[(u32, i64)]) -> DayLedger {
        let mut ledger = DayLedger::new(Date {
            absolute_day: day,
            year: 0,
            month: Month::Jan,
            day: 1,
        });
        for (cabinet, cents) in earnings {
            ledger.record(Some(CabinetId::new(*cabinet)), Money::from_cents(*cents));
        }
        ledger
    }

    #[test]
    fn ties_go_to_the_lowest_cabinet_id() {
        let closed = ledger(0, &[(2, 50), (1, 50), (3, 25)]);
        assert_eq!(
            top_cabinet(&closed),
            Some((CabinetId::new(1), Money::from_cents(50)))
        );
    }

    #[test]
    fn idle_days_have_no_top_cabinet() {
        assert_eq!(top_cabinet(&ledger(0, &[])), None);
    }

    #[test]
    fn trailing_window_drops_the_oldest_day() {
        let mut books = Bookkeeping::with_trailing_days(2);
        let _ = books.summarize(&ledger(0, &[(0, 100)]));
        let _ = books.summarize(&ledger(1, &[(0, 300)]));
        let report = books.summarize(&ledger(2, &[(0, 500)]));
        assert_eq!(report.trailing_average_income, Money::from_cents(400));
    }
}
