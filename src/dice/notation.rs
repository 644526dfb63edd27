use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiceError;

const DEFAULT_COUNT: u32 = 1;
const DEFAULT_SIDES: u32 = 6;
const MIN_SIDES: u32 = 2;

/// Largest dice count one expression may roll.
pub const MAX_DICE: u32 = 10_000;

/// One-tap presets offered by the dice tray.
pub const QUICK_ROLLS: [&str; 5] = ["D6", "2D6", "10D6", "D3", "D20"];

/// Parsed `NdS±M` notation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceExpression {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub valid: bool,
}

impl Default for DiceExpression {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            sides: DEFAULT_SIDES,
            modifier: 0,
            valid: false,
        }
    }
}

impl DiceExpression {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        // a zero face count falls back to the default die rather than a coin
        let sides = if sides == 0 {
            DEFAULT_SIDES
        } else {
            sides.max(MIN_SIDES)
        };
        Self {
            count: count.max(1),
            sides,
            modifier,
            valid: true,
        }
    }

    /// Lenient parse: anything that is not dice notation becomes an invalid `1d6`.
    pub fn parse(input: &str) -> Self {
        input.parse().unwrap_or_default()
    }

    pub fn min(&self) -> i64 {
        i64::from(self.count) + i64::from(self.modifier)
    }

    pub fn max(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier)
    }

    pub fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 + f64::from(self.modifier)
    }
}

pub fn parse_dice_expression(input: Option<&str>) -> DiceExpression {
    input.map(DiceExpression::parse).unwrap_or_default()
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn split_die(text: &str) -> Option<(&str, &str)> {
    text.split_once(|c: char| c == 'd' || c == 'D')
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceError::Empty);
        }

        let malformed = || DiceError::Malformed {
            input: input.to_owned(),
        };
        let overflow = || DiceError::Overflow {
            input: input.to_owned(),
        };

        let (count, rest) = split_die(&compact).ok_or_else(malformed)?;
        let (sides, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(at) => rest.split_at(at),
            None => (rest, ""),
        };
        if !is_digits(count) || !is_digits(sides) {
            return Err(malformed());
        }
        if !modifier.is_empty() && !is_digits(&modifier[1..]) {
            return Err(malformed());
        }

        let count: u32 = count
            .parse()
            .ok()
            .filter(|&count| count <= MAX_DICE)
            .ok_or_else(overflow)?;
        let sides: u32 = sides.parse().map_err(|_| overflow())?;
        let modifier: i32 = if modifier.is_empty() {
            0
        } else {
            modifier.parse().map_err(|_| overflow())?
        };

        Ok(Self::new(count, sides, modifier))
    }
}

/// Canonical notation, always reparsable.
impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier.cmp(&0) {
            Ordering::Greater => write!(f, "+{}", self.modifier),
            Ordering::Less => write!(f, "{}", self.modifier),
            Ordering::Equal => Ok(()),
        }
    }
}

/// Turns a preset such as `D6` or `2D6` into `1d6` / `2d6`.
pub fn normalize_quick(preset: &str) -> String {
    let parsed = split_die(preset).and_then(|(count, sides)| {
        let count = if count.is_empty() {
            Some(DEFAULT_COUNT)
        } else if is_digits(count) {
            count.parse::<u32>().ok()
        } else {
            None
        };
        let sides = if is_digits(sides) {
            sides.parse::<u32>().ok()
        } else {
            None
        };
        count.zip(sides)
    });

    match parsed {
        Some((count, sides)) => format!("{count}d{sides}"),
        None => format!("{DEFAULT_COUNT}d{DEFAULT_SIDES}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifier_forms() {
        assert_eq!(
            DiceExpression::parse("2d6+3"),
            DiceExpression {
                count: 2,
                sides: 6,
                modifier: 3,
                valid: true
            }
        );
        assert_eq!(DiceExpression::parse("3D8-2").modifier, -2);
        assert_eq!(DiceExpression::parse("10d6").modifier, 0);
    }

    #[test]
    fn ignores_whitespace_anywhere() {
        let expr = DiceExpression::parse(" 2 D 6 - 1 ");
        assert_eq!((expr.count, expr.sides, expr.modifier), (2, 6, -1));
        assert!(expr.valid);
    }

    #[test]
    fn garbage_falls_back_to_invalid_d6() {
        let fallback = DiceExpression {
            count: 1,
            sides: 6,
            modifier: 0,
            valid: false,
        };
        for input in [
            "garbage", "", "d6", "2d", "2d6+", "2d6+-1", "2x6", "2d6+1+1", "1.5d6", "+2d6",
        ] {
            assert_eq!(DiceExpression::parse(input), fallback, "input {input:?}");
        }
        assert_eq!(parse_dice_expression(None), fallback);
    }

    #[test]
    fn count_and_sides_are_floored() {
        let expr = DiceExpression::parse("0d1");
        assert_eq!((expr.count, expr.sides), (1, 2));
        assert!(expr.valid);
        assert_eq!(DiceExpression::parse("1d0").sides, 6);
    }

    #[test]
    fn strict_parse_reports_reason() {
        assert_eq!("  ".parse::<DiceExpression>(), Err(DiceError::Empty));
        assert_eq!(
            "two dice".parse::<DiceExpression>(),
            Err(DiceError::Malformed {
                input: "two dice".into()
            })
        );
        assert_eq!(
            "99999999999d6".parse::<DiceExpression>(),
            Err(DiceError::Overflow {
                input: "99999999999d6".into()
            })
        );
        assert!(!DiceExpression::parse("99999999999d6").valid);
    }

    #[test]
    fn dice_count_is_capped() {
        assert_eq!(DiceExpression::parse("10000d6").count, MAX_DICE);
        assert_eq!(
            "600000000d6".parse::<DiceExpression>(),
            Err(DiceError::Overflow {
                input: "600000000d6".into()
            })
        );
        let fallback = DiceExpression::parse("10001d6");
        assert!(!fallback.valid);
        assert_eq!(fallback.count, 1);
    }

    #[test]
    fn display_is_canonical_and_reparsable() {
        for (input, canonical) in [
            ("2 d 6 + 3", "2d6+3"),
            ("4D8-1", "4d8-1"),
            ("1d6+0", "1d6"),
            ("0d0", "1d6"),
        ] {
            let expr = DiceExpression::parse(input);
            assert_eq!(expr.to_string(), canonical);
            assert_eq!(DiceExpression::parse(&expr.to_string()), expr);
        }
        assert_eq!(DiceExpression::default().to_string(), "1d6");
    }

    #[test]
    fn range_and_average_include_modifier() {
        let expr = DiceExpression::parse("2d6+3");
        assert_eq!(expr.min(), 5);
        assert_eq!(expr.max(), 15);
        assert!((expr.average() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn quick_presets_normalize() {
        let normalized: Vec<String> = QUICK_ROLLS.iter().map(|q| normalize_quick(q)).collect();
        assert_eq!(normalized, ["1d6", "2d6", "10d6", "1d3", "1d20"]);
        assert_eq!(normalize_quick("d6+1"), "1d6");
        assert_eq!(normalize_quick("shuffle"), "1d6");
        assert_eq!(normalize_quick("003d4"), "3d4");
    }
}
