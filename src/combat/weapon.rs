use serde::{Deserialize, Serialize};

use super::math::{probability_from_target, wound_target};

/// Weapon characteristic as it appears on a datasheet: a number or notation text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WeaponStat {
    Number(f64),
    Text(String),
}

impl WeaponStat {
    pub fn value(&self) -> StatValue {
        match self {
            WeaponStat::Number(value) => StatValue::Fixed { value: *value },
            WeaponStat::Text(text) => parse_stat_value(text),
        }
    }
}

/// Interpreted weapon characteristic. Unrecognised dice text keeps no range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatValue {
    Fixed {
        value: f64,
    },
    Dice {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avg: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Fixed { value: 0.0 }
    }
}

impl StatValue {
    pub fn average(&self) -> f64 {
        match self {
            StatValue::Fixed { value } => *value,
            StatValue::Dice { avg, .. } => avg.unwrap_or(0.0),
        }
    }
}

/// Parses `5`, `D3`, `2D6`, `D6+1`, `2D3+3` and similar.
pub fn parse_stat_value(raw: &str) -> StatValue {
    let text = raw.trim().to_ascii_uppercase();
    if is_digits(&text) {
        if let Ok(value) = text.parse::<f64>() {
            return StatValue::Fixed { value };
        }
    }

    let range = dice_range(&text);
    StatValue::Dice {
        value: text,
        avg: range.map(|(avg, _, _)| avg),
        min: range.map(|(_, min, _)| min),
        max: range.map(|(_, _, max)| max),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn dice_range(text: &str) -> Option<(f64, u64, u64)> {
    let (count, rest) = text.split_once('D')?;
    let (sides, bonus) = match rest.split_once('+') {
        Some((sides, bonus)) => (sides, Some(bonus)),
        None => (rest, None),
    };

    let count: u64 = if count.is_empty() {
        1
    } else if is_digits(count) {
        count.parse().ok()?
    } else {
        return None;
    };
    let sides: u64 = if is_digits(sides) { sides.parse().ok()? } else { return None };
    let bonus: u64 = match bonus {
        Some(bonus) if is_digits(bonus) => bonus.parse().ok()?,
        Some(_) => return None,
        None => 0,
    };
    if count == 0 || sides == 0 {
        return None;
    }

    let avg = count as f64 * (sides as f64 + 1.0) / 2.0 + bonus as f64;
    let min = count.checked_add(bonus)?;
    let max = count.checked_mul(sides)?.checked_add(bonus)?;
    Some((avg, min, max))
}

/// Finds `words` in order (case-insensitive, optional whitespace between them)
/// followed by a number, and returns that number.
fn keyword_value(text: &str, words: &[&str]) -> u32 {
    let lower = text.to_ascii_lowercase();
    let Some((first, rest)) = words.split_first() else {
        return 0;
    };

    for (start, _) in lower.match_indices(first) {
        let mut cursor = lower[start + first.len()..].trim_start();
        let mut matched = true;
        for word in rest {
            match cursor.strip_prefix(word) {
                Some(after) => cursor = after.trim_start(),
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if !matched {
            continue;
        }
        let digits: &str = cursor
            .find(|c: char| !c.is_ascii_digit())
            .map_or(cursor, |end| &cursor[..end]);
        if !digits.is_empty() {
            return digits.parse().unwrap_or(0);
        }
    }
    0
}

/// `X` from a "Rapid Fire X" weapon type, else 0.
pub fn parse_rapid_fire(weapon_type: &str) -> u32 {
    keyword_value(weapon_type, &["rapid", "fire"])
}

/// `X` from "Sustained Hits X" in a type or keyword line, else 0.
pub fn parse_sustained_hits(keywords: &str) -> u32 {
    keyword_value(keywords, &["sustained", "hits"])
}

/// Inputs for the average-outcome chain of one weapon against one target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttackProfile {
    #[serde(default)]
    pub attacks: Option<WeaponStat>,
    #[serde(default)]
    pub models_in_range: u32,
    #[serde(default)]
    pub hit_target: Option<u8>,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub toughness: u32,
    #[serde(default)]
    pub best_save: Option<u8>,
    #[serde(default)]
    pub damage: Option<WeaponStat>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpectedOutcome {
    pub hits: f64,
    pub wounds: f64,
    pub unsaved: f64,
    pub damage: f64,
}

fn stat_average(stat: Option<&WeaponStat>) -> f64 {
    stat.map(|stat| stat.value().average()).unwrap_or(0.0)
}

/// Average hits, wounds, unsaved wounds and damage. A missing characteristic
/// contributes zero, except a missing save, which lets every wound through.
pub fn expected_outcome(profile: &AttackProfile) -> ExpectedOutcome {
    let models = f64::from(profile.models_in_range.max(1));
    let attacks = stat_average(profile.attacks.as_ref()) * models;
    let p_hit = profile
        .hit_target
        .and_then(probability_from_target)
        .unwrap_or(0.0);
    let p_wound = wound_target(profile.strength, profile.toughness)
        .and_then(probability_from_target)
        .unwrap_or(0.0);
    let p_save = profile
        .best_save
        .and_then(probability_from_target)
        .unwrap_or(0.0);

    let hits = attacks * p_hit;
    let wounds = hits * p_wound;
    let unsaved = wounds * (1.0 - p_save);
    ExpectedOutcome {
        hits,
        wounds,
        unsaved,
        damage: unsaved * stat_average(profile.damage.as_ref()),
    }
}
