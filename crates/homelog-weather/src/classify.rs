//! Rule tables turning raw readings into words.
//!
//! Every table is scanned in order and the first half-open `[min, max)`
//! range containing the value wins.

use homelog_core::units::round_half_even;

struct Direction {
    name: &'static str,
    abbr: &'static str,
    min: f64,
    max: f64,
}

/// 16 buckets of 22.5 degrees, offset by 11.25; north appears twice.
const DIRECTIONS: [Direction; 17] = [
    Direction { name: "north", abbr: "N", min: 348.75, max: 360.0 },
    Direction { name: "north", abbr: "N", min: 0.0, max: 11.25 },
    Direction { name: "north-northeast", abbr: "NNE", min: 11.25, max: 33.75 },
    Direction { name: "northeast", abbr: "NE", min: 33.75, max: 56.25 },
    Direction { name: "east-northeast", abbr: "ENE", min: 56.25, max: 78.75 },
    Direction { name: "east", abbr: "E", min: 78.75, max: 101.25 },
    Direction { name: "east-southeast", abbr: "ESE", min: 101.25, max: 123.75 },
    Direction { name: "southeast", abbr: "SE", min: 123.75, max: 146.25 },
    Direction { name: "south-southeast", abbr: "SSE", min: 146.25, max: 168.75 },
    Direction { name: "south", abbr: "S", min: 168.75, max: 191.25 },
    Direction { name: "south-southwest", abbr: "SSW", min: 191.25, max: 213.75 },
    Direction { name: "southwest", abbr: "SW", min: 213.75, max: 236.25 },
    Direction { name: "west-southwest", abbr: "WSW", min: 236.25, max: 258.75 },
    Direction { name: "west", abbr: "W", min: 258.75, max: 281.25 },
    Direction { name: "west-northwest", abbr: "WNW", min: 281.25, max: 303.75 },
    Direction { name: "northwest", abbr: "NW", min: 303.75, max: 326.25 },
    Direction { name: "north-northwest", abbr: "NNW", min: 326.25, max: 348.75 },
];

/// Compass direction for a bearing in degrees.
///
/// Returns the abbreviation (`"NNE"`) or, with `long`, the full name
/// (`"north-northeast"`). Bearings outside `[0, 360)` are `"nowhere"`.
pub fn classify_direction(degrees: f64, long: bool) -> &'static str {
    DIRECTIONS
        .iter()
        .find(|d| d.min <= degrees && degrees < d.max)
        .map_or("nowhere", |d| if long { d.name } else { d.abbr })
}

const VISIBILITY: [(&str, f64, f64); 9] = [
    ("practically nothing", 0.0, 125.0),
    ("250 ft", 125.0, 375.0),
    ("500 ft", 375.0, 875.0),
    ("750 ft", 875.0, 1000.0),
    ("1/4 mile", 1000.0, 1980.0),
    ("1/2 mile", 1980.0, 3300.0),
    ("3/4 mile", 3300.0, 4620.0),
    ("1 mile", 4620.0, 6600.0),
    ("1.5 miles", 6600.0, 9900.0),
];

const FEET_PER_MILE: f64 = 5280.0;
const OPEN_MILES_MIN: f64 = 9900.0;
const OPEN_MILES_MAX: f64 = 999_999.0;

/// Visibility in feet as a phrase such as `"1/2 mile"` or `"6 miles"`.
pub fn classify_visibility(feet: f64) -> String {
    if let Some((desc, _, _)) = VISIBILITY
        .iter()
        .find(|(_, min, max)| *min <= feet && feet < *max)
    {
        return (*desc).to_string();
    }

    if (OPEN_MILES_MIN..OPEN_MILES_MAX).contains(&feet) {
        return format!("{} miles", round_half_even(feet / FEET_PER_MILE));
    }

    "unclear at this time".to_string()
}

/// New moon appears at both ends of the cycle.
const MOON_PHASES: [(&str, f64, f64); 9] = [
    ("new moon", 0.0, 0.0625),
    ("waxing crescent", 0.0625, 0.1875),
    ("first quarter", 0.1875, 0.3125),
    ("waxing gibbous", 0.3125, 0.4375),
    ("full moon", 0.4375, 0.5625),
    ("waning gibbous", 0.5625, 0.6875),
    ("last quarter", 0.6875, 0.8125),
    ("waning crescent", 0.8125, 0.9375),
    ("new moon", 0.9375, 1.0),
];

/// Name of the moon phase for a lunation fraction in `[0, 1)`.
pub fn classify_moon_phase(value: f64) -> &'static str {
    MOON_PHASES
        .iter()
        .find(|(_, min, max)| *min <= value && value < *max)
        .map_or("a mystery", |(name, _, _)| *name)
}
