use arcade_manager_core::{CatalogRecord, Command, CustomerProfile, DayPhase, Event, Genre, Money};
use arcade_manager_system_bookkeeping::Bookkeeping;
use arcade_manager_world::{self as world, query, World, DEFAULT_LOGIC_STEP};

fn furnished_world() -> World {
    let mut world = World::with_seed(11);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureDayLength { ticks: 40 }, &mut events);
    world::apply(
        &mut world,
        Command::PlaceCabinet {
            record: CatalogRecord {
                name: "PAC".to_owned(),
                description: "Maze chase".to_owned(),
                release_year: 1980,
                genre: Genre::new("MAZE"),
                players: 1,
            },
            position: None,
        },
        &mut events,
    );
    world
}

fn play_day(world: &mut World, books: &mut Bookkeeping) -> Vec<Event> {
    let mut published = Vec::new();
    let mut frame = Vec::new();
    world::apply(world, Command::StartDay, &mut frame);
    world::apply(
        world,
        Command::AdmitCustomer {
            profile: CustomerProfile {
                name: "LARRY".to_owned(),
                preference: Genre::new("MAZE"),
                cash: Money::from_dollars(1),
                patience: 100,
            },
        },
        &mut frame,
    );
    books.handle(&frame, &mut published);

    while query::phase(world) != DayPhase::Closed {
        let mut frame = Vec::new();
        world::apply(
            world,
            Command::Tick {
                dt: DEFAULT_LOGIC_STEP,
            },
            &mut frame,
        );
        books.handle(&frame, &mut published);
    }
    published
}

#[test]
fn publishes_exactly_one_report_per_closed_day() {
    let mut world = furnished_world();
    let mut books = Bookkeeping::new();

    let published = play_day(&mut world, &mut books);
    assert_eq!(published.len(), 1);
    let Event::DayReportPublished { report } = &published[0] else {
        panic!("unexpected event published: {:?}", published[0]);
    };

    let ledger = query::ledger(&world);
    assert_eq!(report.date, ledger.date);
    assert_eq!(report.income, ledger.income);
    assert_eq!(report.net, ledger.income - ledger.expenses);
    assert_eq!(report.visitors, 1);
    assert!(report.plays > 0, "the only customer plays at least once");
    assert_eq!(
        report.top_cabinet.map(|(_, income)| income),
        Some(report.income)
    );
    assert_eq!(report.trailing_average_income, report.income);
    assert_eq!(books.last_report(), Some(report));
}

#[test]
fn trailing_average_spans_consecutive_days() {
    let mut world = furnished_world();
    let mut books = Bookkeeping::new();

    let first = play_day(&mut world, &mut books);
    let mut events = Vec::new();
    world::apply(&mut world, Command::AdvanceDay, &mut events);
    let idle = {
        let mut published = Vec::new();
        world::apply(&mut world, Command::StartDay, &mut events);
        while query::phase(&world) != DayPhase::Closed {
            let mut frame = Vec::new();
            world::apply(
                &mut world,
                Command::Tick {
                    dt: DEFAULT_LOGIC_STEP,
                },
                &mut frame,
            );
            books.handle(&frame, &mut published);
        }
        published
    };

    let (Event::DayReportPublished { report: busy }, Event::DayReportPublished { report: quiet }) =
        (&first[0], &idle[0])
    else {
        panic!("expected two published reports");
    };
    assert_eq!(quiet.income, Money::ZERO);
    assert_eq!(quiet.top_cabinet, None);
    assert_eq!(
        quiet.trailing_average_income,
        Money::from_cents(busy.income.cents() / 2)
    );
}

#[test]
fn ignores_everything_but_closed_days() {
    let mut books = Bookkeeping::new();
    let mut published = Vec::new();
    books.handle(
        &[
            Event::TimeAdvanced {
                dt: DEFAULT_LOGIC_STEP,
            },
            Event::DayPhaseChanged {
                phase: DayPhase::Running,
            },
        ],
        &mut published,
    );
    assert!(published.is_empty());
    assert!(books.last_report().is_none());
}
