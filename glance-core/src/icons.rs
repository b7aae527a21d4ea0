//! Condition-code to icon mapping.
//!
//! Based on the OpenWeatherMap condition code table. The rules are an
//! ordered list of inclusive ranges and the FIRST matching rule wins; the
//! ranges are not disjoint (761 sits in both the fog band and the storm
//! singletons), so declaration order is the tie-break, not specificity.

/// The icon the face shows for the cached condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    /// Thunderstorm.
    Storm,
    /// Drizzle.
    LightRain,
    /// Rain.
    Rain,
    /// Snow and freezing rain.
    Snow,
    /// Fog, haze, dust.
    Fog,
    /// Clear sky.
    Clear,
    /// Few clouds.
    LightClouds,
    /// Scattered to overcast clouds.
    Cloudy,
}

/// Ordered, first-match-wins rules: (low, high, icon), bounds inclusive.
const ICON_RULES: &[(i32, i32, Icon)] = &[
    (200, 232, Icon::Storm),
    (300, 321, Icon::LightRain),
    (500, 504, Icon::Rain),
    (511, 511, Icon::Snow),
    (520, 531, Icon::Rain),
    (600, 622, Icon::Snow),
    (701, 761, Icon::Fog),
    (761, 761, Icon::Storm),
    (781, 781, Icon::Storm),
    (800, 800, Icon::Clear),
    (801, 801, Icon::LightClouds),
    (802, 804, Icon::Cloudy),
];

/// Look up the icon for a condition code.
///
/// Returns `None` for unmapped codes (the face draws no icon).
pub fn icon_for(condition_code: i32) -> Option<Icon> {
    ICON_RULES
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&condition_code))
        .map(|(_, _, icon)| *icon)
}
