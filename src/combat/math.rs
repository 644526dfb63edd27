use serde::{Deserialize, Serialize};

const MIN_TARGET: u8 = 2;
const MAX_TARGET: u8 = 6;

/// D6 roll needed to wound, from the strength-versus-toughness table.
pub fn wound_target(strength: u32, toughness: u32) -> Option<u8> {
    if strength == 0 || toughness == 0 {
        return None;
    }
    let (strength, toughness) = (u64::from(strength), u64::from(toughness));
    let target = if strength >= 2 * toughness {
        2
    } else if strength > toughness {
        3
    } else if strength == toughness {
        4
    } else if strength * 2 <= toughness {
        6
    } else {
        5
    };
    Some(target)
}

/// Chance of rolling `target`+ on a D6.
pub fn probability_from_target(target: u8) -> Option<f64> {
    if target < MIN_TARGET {
        return None;
    }
    Some(((7.0 - f64::from(target)) / 6.0).clamp(0.0, 1.0))
}

pub fn explain_wound_rule(strength: u32, toughness: u32) -> Option<&'static str> {
    let rule = match wound_target(strength, toughness)? {
        2 => "S ≥ 2T → 2+",
        3 => "S > T → 3+",
        4 => "S = T → 4+",
        6 => "S ≤ T/2 → 6+",
        _ => "S < T → 5+",
    };
    Some(rule)
}

/// Reads a save characteristic such as `3+` by its digits; zero means no save.
pub fn parse_save(raw: &str) -> Option<u8> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u8>().ok().filter(|&save| save > 0)
}

/// Armour penetration as a signed integer; accepts the typographic minus.
pub fn parse_ap(raw: &str) -> i32 {
    let normalized = raw.replace('\u{2212}', "-");
    let normalized = normalized.trim();
    let Some(start) = normalized.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };
    let end = normalized[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(normalized.len(), |offset| start + offset);
    let value: i32 = normalized[start..end].parse().unwrap_or(0);
    if normalized[..start].ends_with('-') {
        -value
    } else {
        value
    }
}

/// Worsens an armour save by the magnitude of `ap`, within 2+..6+.
pub fn apply_ap_to_save(armour_save: Option<u8>, ap: i32) -> Option<u8> {
    let save = armour_save.filter(|&save| save > 0)?;
    let worsened = i64::from(save) + i64::from(ap.unsigned_abs());
    Some(worsened.clamp(i64::from(MIN_TARGET), i64::from(MAX_TARGET)) as u8)
}

pub fn best_save_target_after_ap(
    armour_save: Option<u8>,
    ap: i32,
    invuln_save: Option<u8>,
) -> Option<u8> {
    let armour = apply_ap_to_save(armour_save, ap);
    match (armour, invuln_save.filter(|&save| save > 0)) {
        (Some(armour), Some(invuln)) => Some(armour.min(invuln)),
        (armour, invuln) => armour.or(invuln),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaveKind {
    Armour,
    Invuln,
}

/// Save breakdown shown to the attacker after AP.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefenderSave {
    pub armour_after_ap: Option<u8>,
    pub invuln: Option<u8>,
    pub best: Option<u8>,
    pub used: Option<SaveKind>,
}

/// Picks the save the defender rolls; an invulnerable save wins ties.
pub fn compute_defender_save(
    armour_save: Option<u8>,
    ap: i32,
    invuln_save: Option<u8>,
) -> DefenderSave {
    let armour_after_ap = apply_ap_to_save(armour_save, ap);
    let invuln = invuln_save.filter(|&save| save > 0);

    let (best, used) = match (invuln, armour_after_ap) {
        (Some(inv), None) => (Some(inv), Some(SaveKind::Invuln)),
        (Some(inv), Some(armour)) if inv <= armour => (Some(inv), Some(SaveKind::Invuln)),
        (_, Some(armour)) => (Some(armour), Some(SaveKind::Armour)),
        (None, None) => (None, None),
    };

    DefenderSave {
        armour_after_ap,
        invuln,
        best,
        used,
    }
}
