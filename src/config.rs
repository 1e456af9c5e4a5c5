use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "workouts";
pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// How the cycling form treats the elevation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ElevationRule {
    /// Any finite number, including negative net elevation.
    #[default]
    AnyFinite,
    /// Finite and `>= 0`.
    NonNegative,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_key: String,
    pub map_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,
    /// How long the form stays `display: none` after hiding.
    pub hide_delay: Duration,
    pub pan_duration: Duration,
    pub elevation_rule: ElevationRule,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            map_zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            hide_delay: Duration::from_millis(1000),
            pan_duration: Duration::from_secs(1),
            elevation_rule: ElevationRule::AnyFinite,
        }
    }
}
