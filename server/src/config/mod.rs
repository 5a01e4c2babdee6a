use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::booking::{SeatGrid, SeatPricing, TierThresholds};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CINEMA_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HOLD_TTL_SECS: i64 = 600;
const DEFAULT_SESSION_TTL_SECS: i64 = 1800;
const DEFAULT_SEAT_ROWS: u16 = 10;
const DEFAULT_SEAT_COLUMNS: u16 = 10;

pub struct Config {
    pub port: u16,
    /// No URL means holds and confirmations live in process memory.
    pub database_url: Option<String>,
    pub cinema_api_url: String,
    pub upstream_timeout: Duration,
    pub hold_ttl: chrono::Duration,
    pub session_ttl: chrono::Duration,
    pub default_grid: SeatGrid,
    pub room_layouts: HashMap<i64, SeatGrid>,
    pub seat_pricing: SeatPricing,
    pub tier_thresholds: TierThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            cinema_api_url: DEFAULT_CINEMA_API_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            hold_ttl: chrono::Duration::seconds(DEFAULT_HOLD_TTL_SECS),
            session_ttl: chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            default_grid: SeatGrid {
                rows: DEFAULT_SEAT_ROWS,
                columns: DEFAULT_SEAT_COLUMNS,
            },
            room_layouts: HashMap::new(),
            seat_pricing: SeatPricing::default(),
            tier_thresholds: TierThresholds::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pricing = defaults.seat_pricing;
        let tiers = defaults.tier_thresholds;

        let rows = load("SEAT_ROWS", DEFAULT_SEAT_ROWS);
        let columns = load("SEAT_COLUMNS", DEFAULT_SEAT_COLUMNS);
        let default_grid = SeatGrid::new(rows, columns).unwrap_or_else(|e| {
            warn!("Invalid default seat grid {rows}x{columns}: {e}");
            defaults.default_grid
        });

        Self {
            port: load("PORT", DEFAULT_PORT),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            cinema_api_url: env::var("CINEMA_API_URL")
                .unwrap_or_else(|_| DEFAULT_CINEMA_API_URL.to_string()),
            upstream_timeout: Duration::from_secs(load(
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
            hold_ttl: chrono::Duration::seconds(load("HOLD_TTL_SECS", DEFAULT_HOLD_TTL_SECS)),
            session_ttl: chrono::Duration::seconds(load("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)),
            default_grid,
            room_layouts: env::var("ROOM_LAYOUTS")
                .map(|raw| parse_room_layouts(&raw))
                .unwrap_or_default(),
            seat_pricing: SeatPricing {
                normal: load::<Decimal>("PRICE_NORMAL", pricing.normal),
                vip: load::<Decimal>("PRICE_VIP", pricing.vip),
                couple: load::<Decimal>("PRICE_COUPLE", pricing.couple),
            },
            tier_thresholds: TierThresholds {
                gold: load("TIER_GOLD", tiers.gold),
                diamond: load("TIER_DIAMOND", tiers.diamond),
                vip: load("TIER_VIP", tiers.vip),
            },
        }
    }

    /// Grid for rooms whose seats are not defined by the cinema backend.
    pub fn grid_for_room(&self, room_id: i64) -> SeatGrid {
        self.room_layouts
            .get(&room_id)
            .copied()
            .unwrap_or(self.default_grid)
    }
}

fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}; using default {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

/// Parses `"<room_id>:<rows>x<columns>"` entries separated by commas.
/// Malformed entries are skipped with a warning.
pub fn parse_room_layouts(raw: &str) -> HashMap<i64, SeatGrid> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match parse_room_layout(entry) {
            Some(layout) => Some(layout),
            None => {
                warn!("Ignoring malformed room layout '{entry}'");
                None
            }
        })
        .collect()
}

fn parse_room_layout(entry: &str) -> Option<(i64, SeatGrid)> {
    let (room, dims) = entry.split_once(':')?;
    let (rows, columns) = dims.trim().split_once(['x', 'X'])?;
    let grid = SeatGrid::new(rows.trim().parse().ok()?, columns.trim().parse().ok()?).ok()?;
    Some((room.trim().parse().ok()?, grid))
}
