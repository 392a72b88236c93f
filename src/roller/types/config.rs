//! Dice configuration types and title resolution
//!
//! A configuration is the side count plus the user's custom title for each
//! side. Presets are named, stored copies of a configuration.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub const MIN_SIDES: u32 = 2;
pub const MAX_SIDES: u32 = 1000;
pub const DEFAULT_SIDES: u32 = 6;

/// Label shown when the roll pipeline fails.
pub const ERROR_LABEL: &str = "Error";
/// Label shown while a roll is animating.
pub const ROLLING_LABEL: &str = "Rolling...";

/// Custom titles keyed by side index (1-based).
pub type SideTitles = BTreeMap<u32, String>;

/// Current side count and custom titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceConfig {
    #[serde(default = "default_sides", deserialize_with = "lenient_sides")]
    pub sides: u32,

    #[serde(default, deserialize_with = "lenient_titles")]
    pub titles: SideTitles,
}

fn default_sides() -> u32 {
    DEFAULT_SIDES
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            sides: DEFAULT_SIDES,
            titles: SideTitles::new(),
        }
    }
}

impl DiceConfig {
    pub fn new(sides: u32) -> Self {
        Self {
            sides: clamp_sides(sides),
            titles: SideTitles::new(),
        }
    }

    pub fn is_coin(&self) -> bool {
        self.sides == MIN_SIDES
    }

    /// Change the side count. Titles for indices past the new count are kept so
    /// they come back if the count grows again.
    pub fn set_sides(&mut self, sides: u32) {
        self.sides = clamp_sides(sides);
    }

    /// Set or clear (empty text) the custom title of a side.
    pub fn set_title(&mut self, side: u32, text: &str) {
        if text.is_empty() {
            self.titles.remove(&side);
        } else {
            self.titles.insert(side, text.to_string());
        }
    }

    pub fn title_for(&self, side: u32) -> String {
        resolve_title(side, self.sides, &self.titles)
    }
}

/// Clamp a requested side count into the supported range.
pub fn clamp_sides(sides: u32) -> u32 {
    sides.clamp(MIN_SIDES, MAX_SIDES)
}

/// Parse free-form side count input. Anything unparsable means the default.
pub fn parse_sides(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(n) if n < MIN_SIDES as i64 => MIN_SIDES,
        Ok(n) if n > MAX_SIDES as i64 => MAX_SIDES,
        Ok(n) => n as u32,
        Err(_) => DEFAULT_SIDES,
    }
}

/// Default label for a side when no custom title is set.
pub fn default_title(side: u32, sides: u32) -> String {
    match (sides, side) {
        (MIN_SIDES, 1) => "Heads".to_string(),
        (MIN_SIDES, _) => "Tails".to_string(),
        _ => format!("Side {}", side),
    }
}

/// Map an outcome to its display string. Never fails.
pub fn resolve_title(side: u32, sides: u32, titles: &SideTitles) -> String {
    match titles.get(&side) {
        Some(title) if !title.trim().is_empty() => title.clone(),
        _ => default_title(side, sides),
    }
}

fn lenient_sides<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    let sides = match &raw {
        JsonValue::Number(n) => match n.as_i64() {
            Some(v) if v > 0 => clamp_sides(v.min(u32::MAX as i64) as u32),
            _ => DEFAULT_SIDES,
        },
        JsonValue::String(s) => parse_sides(s),
        _ => DEFAULT_SIDES,
    };
    Ok(sides)
}

/// Accept any JSON object for titles, keeping only entries with a numeric key
/// and a string value. Anything else is dropped instead of failing the load.
pub fn titles_from_json(raw: JsonValue) -> SideTitles {
    let mut titles = SideTitles::new();
    if let JsonValue::Object(map) = raw {
        for (key, value) in map {
            let (Ok(side), JsonValue::String(text)) = (key.trim().parse::<u32>(), value) else {
                continue;
            };
            if side >= 1 {
                titles.insert(side, text);
            }
        }
    }
    titles
}

fn lenient_titles<'de, D>(deserializer: D) -> Result<SideTitles, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(titles_from_json)
}

/// A named configuration saved by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default = "default_sides", deserialize_with = "lenient_sides")]
    pub sides: u32,
    #[serde(default, deserialize_with = "lenient_titles")]
    pub titles: SideTitles,
}

impl Preset {
    /// Capture a configuration under a name. Titles are filtered when the
    /// preset is stored.
    pub fn from_config(name: &str, config: &DiceConfig) -> Self {
        Self {
            name: name.trim().to_string(),
            sides: config.sides,
            titles: config.titles.clone(),
        }
    }

    pub fn to_config(&self) -> DiceConfig {
        DiceConfig {
            sides: clamp_sides(self.sides),
            titles: self.titles.clone(),
        }
    }
}

/// Lightweight preset row for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub id: i64,
    pub name: String,
    pub sides: u32,
}

impl PresetEntry {
    pub fn label(&self) -> String {
        format!("{} ({} sides)", self.name, self.sides)
    }
}
