//! TOML configuration for a session: screen, simulation, property, customer
//! pools, and the cabinets installed when a new game starts.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use arcade_manager_core::{CatalogRecord, Genre, Money, PropertyLayout, TilePos};
use arcade_manager_system_arrivals::Config as ArrivalsConfig;
use arcade_manager_world::{property::garage_layout, DEFAULT_DAY_LENGTH, DEFAULT_LOGIC_STEP};
use serde::Deserialize;
use thiserror::Error;

/// Smallest grid the game screens fit on.
pub const MIN_COLUMNS: i32 = 80;
/// Smallest number of rows the game screens fit on.
pub const MIN_ROWS: i32 = 30;

/// Validation failures for otherwise well-formed configuration files.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The grid cannot host the game screens.
    #[error(
        "screen of {columns}x{rows} cells is smaller than the required {}x{}",
        MIN_COLUMNS,
        MIN_ROWS
    )]
    ScreenTooSmall {
        /// Configured columns.
        columns: i32,
        /// Configured rows.
        rows: i32,
    },
    /// Font cells must have a positive size.
    #[error("cell size {width}x{height} must be positive")]
    InvalidCellSize {
        /// Configured cell width in pixels.
        width: f32,
        /// Configured cell height in pixels.
        height: f32,
    },
    /// Logic ticks must consume time.
    #[error("logic step must be at least one millisecond")]
    ZeroLogicStep,
    /// Properties need room for a door and at least one more tile.
    #[error("property {width}x{height} is too small")]
    PropertyTooSmall {
        /// Largest column index.
        width: i32,
        /// Largest row index.
        height: i32,
    },
    /// A cabinet slot lies outside the property.
    #[error("cabinet slot ({column}, {row}) lies outside the property")]
    SlotOutOfBounds {
        /// Slot column.
        column: i32,
        /// Slot row.
        row: i32,
    },
}

/// Complete session configuration; every section falls back to defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArcadeConfig {
    /// Grid dimensions.
    pub screen: ScreenConfig,
    /// Clock and seed.
    pub simulation: SimulationConfig,
    /// Starting property.
    pub property: PropertyConfig,
    /// Pools arriving customers are drawn from.
    pub customers: CustomerConfig,
    /// Cabinets installed when a game starts.
    pub catalog: Vec<CatalogEntry>,
}

/// Grid dimensions and font cell size.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    /// Number of character columns.
    pub columns: i32,
    /// Number of character rows.
    pub rows: i32,
    /// Width of one cell in pixels.
    pub cell_width: f32,
    /// Height of one cell in pixels.
    pub cell_height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            columns: MIN_COLUMNS,
            rows: MIN_ROWS,
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

/// Simulation clock and seed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for every random decision of the session.
    pub seed: u64,
    /// Milliseconds of simulated time per logic tick.
    pub logic_step_ms: u64,
    /// Logic ticks the doors stay open each day.
    pub day_length: u32,
}

impl SimulationConfig {
    /// Simulated time consumed by one logic tick.
    #[must_use]
    pub fn logic_step(&self) -> Duration {
        Duration::from_millis(self.logic_step_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0x0a4c_ade0,
            logic_step_ms: u64::try_from(DEFAULT_LOGIC_STEP.as_millis()).unwrap_or(100),
            day_length: DEFAULT_DAY_LENGTH,
        }
    }
}

/// Starting property; the door sits in the middle of the top wall.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyConfig {
    /// Display name, also used as the arcade name.
    pub name: String,
    /// Largest valid column index.
    pub width: i32,
    /// Largest valid row index.
    pub height: i32,
    /// Maximum customers inside at once.
    pub capacity: u32,
    /// Arrival chance per logic tick in percent when empty.
    pub popularity: u32,
    /// Rent charged when a day starts, in cents.
    pub rent_cents: i64,
    /// Preferred cabinet tiles as `[column, row]` pairs.
    pub cabinet_slots: Vec<[i32; 2]>,
}

impl PropertyConfig {
    /// Builds the world layout, optionally renaming the arcade.
    #[must_use]
    pub fn to_layout(&self, name: Option<&str>) -> PropertyLayout {
        PropertyLayout {
            name: name.unwrap_or(&self.name).to_owned(),
            width: self.width,
            height: self.height,
            door: TilePos::new(self.width / 2, 0),
            capacity: self.capacity,
            popularity: self.popularity,
            rent: Money::from_cents(self.rent_cents),
            cabinet_slots: self
                .cabinet_slots
                .iter()
                .map(|[column, row]| TilePos::new(*column, *row))
                .collect(),
        }
    }
}

impl Default for PropertyConfig {
    fn default() -> Self {
        let garage = garage_layout();
        Self {
            name: garage.name,
            width: garage.width,
            height: garage.height,
            capacity: garage.capacity,
            popularity: garage.popularity,
            rent_cents: garage.rent.cents(),
            cabinet_slots: garage
                .cabinet_slots
                .iter()
                .map(|slot| [slot.column(), slot.row()])
                .collect(),
        }
    }
}

/// Pools arriving customers are drawn from; omitted pools keep the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerConfig {
    /// Customer names.
    pub names: Vec<String>,
    /// Preferred genres.
    pub genres: Vec<String>,
    /// Inclusive range of cash carried in, in cents.
    pub cash_cents: Option<[i64; 2]>,
    /// Inclusive range of starting patience.
    pub patience: Option<[i32; 2]>,
}

impl CustomerConfig {
    /// Configures the arrivals system seeded with `seed`.
    #[must_use]
    pub fn arrivals(&self, seed: u64) -> ArrivalsConfig {
        let mut config = ArrivalsConfig::new(seed)
            .with_names(self.names.clone())
            .with_genres(self.genres.iter().map(|genre| Genre::new(genre)).collect());
        if let Some([low, high]) = self.cash_cents {
            config = config.with_cash_range(Money::from_cents(low), Money::from_cents(high));
        }
        if let Some([low, high]) = self.patience {
            config = config.with_patience_range(low, high);
        }
        config
    }
}

/// Cabinet installed when a game starts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    /// Title of the machine.
    pub name: String,
    /// Short blurb.
    #[serde(default)]
    pub description: String,
    /// Release year.
    pub release_year: i32,
    /// Genre tag.
    pub genre: String,
    /// Simultaneous players.
    #[serde(default = "default_players")]
    pub players: u8,
    /// Price per game in cents; the cabinet default applies when omitted.
    #[serde(default)]
    pub price_cents: Option<i64>,
    /// Explicit tile as `[column, row]`; the next free slot otherwise.
    #[serde(default)]
    pub position: Option<[i32; 2]>,
}

const fn default_players() -> u8 {
    1
}

impl CatalogEntry {
    /// Catalog record handed to the world.
    #[must_use]
    pub fn record(&self) -> CatalogRecord {
        CatalogRecord {
            name: self.name.clone(),
            description: self.description.clone(),
            release_year: self.release_year,
            genre: Genre::new(&self.genre),
            players: self.players,
        }
    }

    /// Requested tile, if any.
    #[must_use]
    pub fn tile(&self) -> Option<TilePos> {
        self.position.map(|[column, row]| TilePos::new(column, row))
    }
}

impl Default for ArcadeConfig {
    /// The garage with two second-hand cabinets.
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            simulation: SimulationConfig::default(),
            property: PropertyConfig::default(),
            customers: CustomerConfig::default(),
            catalog: starter_catalog(),
        }
    }
}

fn starter_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            name: "GALAXY RAID".to_owned(),
            description: "Hold the line against the swarm.".to_owned(),
            release_year: 1979,
            genre: "SHOOTER".to_owned(),
            players: 1,
            price_cents: None,
            position: None,
        },
        CatalogEntry {
            name: "MAZE MUNCHER".to_owned(),
            description: "Eat the dots, dodge the ghosts.".to_owned(),
            release_year: 1980,
            genre: "MAZE".to_owned(),
            players: 2,
            price_cents: None,
            position: None,
        },
    ]
}

impl ArcadeConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse arcade config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let screen = &self.screen;
        if screen.columns < MIN_COLUMNS || screen.rows < MIN_ROWS {
            return Err(ConfigError::ScreenTooSmall {
                columns: screen.columns,
                rows: screen.rows,
            });
        }
        if !(screen.cell_width > 0.0 && screen.cell_height > 0.0) {
            return Err(ConfigError::InvalidCellSize {
                width: screen.cell_width,
                height: screen.cell_height,
            });
        }
        if self.simulation.logic_step_ms == 0 {
            return Err(ConfigError::ZeroLogicStep);
        }

        let property = &self.property;
        if property.width < 1 || property.height < 1 {
            return Err(ConfigError::PropertyTooSmall {
                width: property.width,
                height: property.height,
            });
        }
        let layout = property.to_layout(None);
        if let Some(slot) = layout
            .cabinet_slots
            .iter()
            .find(|slot| !layout.contains(**slot))
        {
            return Err(ConfigError::SlotOutOfBounds {
                column: slot.column(),
                row: slot.row(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_garage() {
        let config = ArcadeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.property.to_layout(None), garage_layout());
        assert_eq!(config.simulation.logic_step(), DEFAULT_LOGIC_STEP);
        assert_eq!(config.catalog.len(), 2);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config = ArcadeConfig::from_toml_str(
            r#"
            [simulation]
            seed = 42

            [property]
            name = "STRIP MALL"
            width = 11
            cabinet_slots = [[2, 3], [4, 3]]

            [[catalog]]
            name = "PINBALL WIZARD"
            release_year = 1975
            genre = "action"
            price_cents = 50
            position = [2, 3]
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.day_length, DEFAULT_DAY_LENGTH);
        assert_eq!(config.screen, ScreenConfig::default());

        let layout = config.property.to_layout(Some("NEON"));
        assert_eq!(layout.name, "NEON");
        assert_eq!(layout.door, TilePos::new(5, 0));
        assert_eq!(layout.height, garage_layout().height);

        let entry = &config.catalog[0];
        assert_eq!(entry.players, 1);
        assert_eq!(entry.record().genre.as_str(), "ACTION");
        assert_eq!(entry.tile(), Some(TilePos::new(2, 3)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ArcadeConfig::from_toml_str("[screen]\ncolour = 3\n").is_err());
    }

    #[test]
    fn rejects_screens_the_layout_does_not_fit() {
        let mut config = ArcadeConfig::default();
        config.screen.rows = 24;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ScreenTooSmall {
                columns: 80,
                rows: 24
            })
        );
    }

    #[test]
    fn rejects_slots_outside_the_property() {
        let mut config = ArcadeConfig::default();
        config.property.cabinet_slots.push([9, 1]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::SlotOutOfBounds { column: 9, row: 1 })
        );
    }

    #[test]
    fn rejects_a_zero_logic_step() {
        let mut config = ArcadeConfig::default();
        config.simulation.logic_step_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLogicStep));
    }
}
