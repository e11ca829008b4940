#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic arrivals system responsible for emitting customer admission
//! commands while the arcade is open.

use std::ops::RangeInclusive;

use arcade_manager_core::{ArrivalOutlook, Command, CustomerProfile, DayPhase, Event, Genre, Money};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_NAMES: [&str; 8] = [
    "LARRY", "JOHN", "SALLY", "MARTHA", "KEVIN", "DORIS", "TERRY", "WANDA",
];
const DEFAULT_GENRES: [&str; 4] = ["MAZE", "ACTION", "SHOOTER", "SPORTS"];
const DEFAULT_CASH_CENTS: RangeInclusive<i64> = 100..=500;
const DEFAULT_PATIENCE: RangeInclusive<i32> = 50..=100;

/// Configuration parameters required to construct the arrivals system.
#[derive(Clone, Debug)]
pub struct Config {
    rng_seed: u64,
    names: Vec<String>,
    genres: Vec<Genre>,
    cash_cents: RangeInclusive<i64>,
    patience: RangeInclusive<i32>,
}

impl Config {
    /// Creates a configuration with the default customer pools and the provided seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            names: DEFAULT_NAMES.iter().map(|name| (*name).to_owned()).collect(),
            genres: DEFAULT_GENRES.iter().map(|genre| Genre::new(genre)).collect(),
            cash_cents: DEFAULT_CASH_CENTS,
            patience: DEFAULT_PATIENCE,
        }
    }

    /// Replaces the pool customer names are drawn from; empty pools are ignored.
    #[must_use]
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        if !names.is_empty() {
            self.names = names;
        }
        self
    }

    /// Replaces the pool preferred genres are drawn from; empty pools are ignored.
    #[must_use]
    pub fn with_genres(mut self, genres: Vec<Genre>) -> Self {
        if !genres.is_empty() {
            self.genres = genres;
        }
        self
    }

    /// Sets the inclusive range of cash customers carry in.
    #[must_use]
    pub fn with_cash_range(mut self, min: Money, max: Money) -> Self {
        let (low, high) = ordered(min.cents().max(0), max.cents().max(0));
        self.cash_cents = low..=high;
        self
    }

    /// Sets the inclusive range of starting patience.
    #[must_use]
    pub fn with_patience_range(mut self, min: i32, max: i32) -> Self {
        let (low, high) = ordered(min.max(0), max.max(0));
        self.patience = low..=high;
        self
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pure system that rolls for a new customer on every logic tick while open.
///
/// The chance per tick is the property's popularity scaled down by how full
/// the property already is.
#[derive(Debug)]
pub struct Arrivals {
    rng: ChaCha8Rng,
    names: Vec<String>,
    genres: Vec<Genre>,
    cash_cents: RangeInclusive<i64>,
    patience: RangeInclusive<i32>,
}

impl Arrivals {
    /// Creates a new arrivals system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            names: config.names,
            genres: config.genres,
            cash_cents: config.cash_cents,
            patience: config.patience,
        }
    }

    /// Consumes events and the current arrival outlook to emit admission commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: DayPhase,
        outlook: ArrivalOutlook,
        out: &mut Vec<Command>,
    ) {
        if phase != DayPhase::Running {
            return;
        }

        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::LogicTicked { .. }))
            .count();
        if ticks == 0 {
            return;
        }

        let chance = arrival_chance(outlook);
        if chance <= 0.0 {
            return;
        }

        for _ in 0..ticks {
            if self.rng.gen_range(0.0..100.0) < chance {
                let profile = self.next_profile();
                out.push(Command::AdmitCustomer { profile });
            }
        }
    }

    fn next_profile(&mut self) -> CustomerProfile {
        let name = self
            .names
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAMES[0].to_owned());
        let preference = self
            .genres
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| Genre::new(DEFAULT_GENRES[0]));
        let cash = Money::from_cents(self.rng.gen_range(self.cash_cents.clone()));
        let patience = self.rng.gen_range(self.patience.clone());
        CustomerProfile {
            name,
            preference,
            cash,
            patience,
        }
    }
}

/// Percent chance that a customer arrives during one logic tick.
#[must_use]
pub fn arrival_chance(outlook: ArrivalOutlook) -> f64 {
    let popularity = f64::from(outlook.popularity).min(100.0);
    (popularity * (1.0 - outlook.busy_ratio())).max(0.0)
}
