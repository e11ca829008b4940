use std::{collections::HashSet, time::Duration};

use arcade_manager_core::{
    CatalogRecord, Command, CustomerProfile, DayPhase, Event, Genre, Money, TilePos,
};
use arcade_manager_world::{
    self as world, property::Occupant, query, World, DEFAULT_LOGIC_STEP,
};
use proptest::prelude::*;

fn record(name: &str, genre: &str, players: u8) -> CatalogRecord {
    CatalogRecord {
        name: name.to_owned(),
        description: format!("{name} cabinet"),
        release_year: 1981,
        genre: Genre::new(genre),
        players,
    }
}

fn profile(index: u32) -> CustomerProfile {
    CustomerProfile {
        name: format!("CUSTOMER {index}"),
        preference: Genre::new(if index % 2 == 0 { "MAZE" } else { "ACTION" }),
        cash: Money::from_dollars(3),
        patience: 60,
    }
}

fn furnished_world(seed: u64) -> World {
    let mut world = World::with_seed(seed);
    let mut events = Vec::new();
    for (name, genre) in [("PAC", "MAZE"), ("DEFENDER", "ACTION"), ("DIG", "MAZE")] {
        world::apply(
            &mut world,
            Command::PlaceCabinet {
                record: record(name, genre, 2),
                position: None,
            },
            &mut events,
        );
    }
    world
}

/// Runs a full day, admitting a customer on every logic tick, and returns
/// every event produced.
fn run_day(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::StartDay, &mut events);
    let mut arrivals = 0;
    while query::phase(world) != DayPhase::Closed {
        let mut frame = Vec::new();
        world::apply(
            world,
            Command::Tick {
                dt: DEFAULT_LOGIC_STEP,
            },
            &mut frame,
        );
        if query::phase(world) == DayPhase::Running {
            world::apply(
                world,
                Command::AdmitCustomer {
                    profile: profile(arrivals),
                },
                &mut frame,
            );
            arrivals += 1;
        }
        assert_occupancy_consistent(world);
        events.extend(frame);
    }
    events
}

fn assert_occupancy_consistent(world: &World) {
    let layout = query::property_layout(world);
    let mut seen = HashSet::new();
    for customer in query::customer_view(world).iter() {
        assert!(layout.contains(customer.position));
        assert!(seen.insert(customer.position), "two occupants share a tile");
        assert_eq!(
            query::occupant(world, customer.position),
            Some(Occupant::Customer(customer.id))
        );
    }
    for cabinet in query::cabinet_view(world).iter() {
        assert!(seen.insert(cabinet.position), "customer standing on a cabinet");
        assert_eq!(
            cabinet.busy,
            usize::from(cabinet.current_players) == cabinet.play_positions.len()
        );
    }
}

#[test]
fn two_player_cabinet_in_garage_gets_paired_positions() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceCabinet {
            record: record("DUEL", "FIGHTING", 2),
            position: Some(TilePos::new(3, 3)),
        },
        &mut events,
    );

    let view = query::cabinet_view(&world);
    let cabinet = view.iter().next().expect("cabinet placed");
    assert_eq!(
        cabinet.play_positions,
        vec![TilePos::new(3, 2), TilePos::new(4, 3)]
    );
    for tile in &cabinet.play_positions {
        assert_eq!(tile.chebyshev_distance(cabinet.position), 1);
    }
}

#[test]
fn a_full_day_books_income_and_closes_once() {
    let mut world = furnished_world(0xfeed);
    let events = run_day(&mut world);

    let closed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::DayClosed { ledger } => Some(ledger.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(closed.len(), 1);
    let ledger = &closed[0];

    let plays = events
        .iter()
        .filter(|event| matches!(event, Event::PlayStarted { .. }))
        .count();
    assert_eq!(usize::try_from(ledger.plays).ok(), Some(plays));
    assert!(ledger.visitors > 0);

    let booked: Money = ledger
        .income_per_cabinet
        .values()
        .fold(Money::ZERO, |total, amount| total + *amount);
    assert_eq!(booked, ledger.income);
    assert!(query::customer_view(&world).is_empty());
}

#[test]
fn identical_seeds_replay_identically() {
    let mut first = furnished_world(42);
    let mut second = furnished_world(42);
    assert_eq!(run_day(&mut first), run_day(&mut second));
    assert_eq!(query::funds(&first), query::funds(&second));
}

#[test]
fn customers_never_pay_more_than_they_carry() {
    let mut world = furnished_world(7);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartDay, &mut events);
    world::apply(
        &mut world,
        Command::AdmitCustomer {
            profile: CustomerProfile {
                cash: Money::from_cents(60),
                ..profile(0)
            },
        },
        &mut events,
    );
    for _ in 0..100 {
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        for customer in query::customer_view(&world).iter() {
            assert!(customer.cash >= Money::ZERO);
        }
    }
    let spent: Money = events
        .iter()
        .filter_map(|event| match event {
            Event::PlayStarted { price, .. } => Some(*price),
            _ => None,
        })
        .fold(Money::ZERO, |total, price| total + price);
    assert!(spent <= Money::from_cents(60));
}

proptest! {
    #[test]
    fn is_space_empty_respects_bounds_and_occupants(
        column in -3i32..12,
        row in -3i32..8,
        seed in any::<u64>(),
    ) {
        let mut world = furnished_world(seed);
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartDay, &mut events);
        for index in 0..2 {
            world::apply(
                &mut world,
                Command::AdmitCustomer { profile: profile(index) },
                &mut events,
            );
            world::apply(
                &mut world,
                Command::Tick { dt: DEFAULT_LOGIC_STEP * 3 },
                &mut events,
            );
        }

        let pos = TilePos::new(column, row);
        let layout = query::property_layout(&world);
        if !layout.contains(pos) {
            prop_assert!(!query::is_space_empty(&world, pos));
        }
        if query::occupant(&world, pos).is_some() {
            prop_assert!(!query::is_space_empty(&world, pos));
        }
        for cabinet in query::cabinet_view(&world).iter() {
            prop_assert!(!query::is_space_empty(&world, cabinet.position));
        }
        for customer in query::customer_view(&world).iter() {
            prop_assert!(!query::is_space_empty(&world, customer.position));
        }
    }
}

#[test]
fn cabinet_under_the_door_never_traps_closing_customers() {
    for seed in 0..40 {
        let mut world = World::with_seed(seed);
        let door = query::property_layout(&world).door;
        let mut events = Vec::new();
        world::apply(&mut world, Command::ConfigureDayLength { ticks: 40 }, &mut events);
        world::apply(
            &mut world,
            Command::PlaceCabinet {
                record: record("BLOCKER", "MAZE", 1),
                position: Some(door.offset(0, 1)),
            },
            &mut events,
        );
        world::apply(&mut world, Command::StartDay, &mut events);
        world::apply(
            &mut world,
            Command::AdmitCustomer {
                profile: CustomerProfile {
                    cash: Money::from_dollars(100),
                    patience: 1000,
                    ..profile(0)
                },
            },
            &mut events,
        );
        assert_eq!(query::customer_view(&world).len(), 1);

        let mut ticks = 0;
        while query::phase(&world) != DayPhase::Closed && ticks < 5000 {
            world::apply(
                &mut world,
                Command::Tick {
                    dt: DEFAULT_LOGIC_STEP,
                },
                &mut events,
            );
            assert_occupancy_consistent(&world);
            ticks += 1;
        }

        assert_eq!(query::phase(&world), DayPhase::Closed, "seed {seed} stuck");
        assert!(query::customer_view(&world).is_empty());
    }
}
