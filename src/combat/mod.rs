//! Attack-helper math: wound table, saves after AP and average outcomes.

pub mod math;
pub mod weapon;

pub use math::{
    apply_ap_to_save, best_save_target_after_ap, compute_defender_save, explain_wound_rule,
    parse_ap, parse_save, probability_from_target, wound_target, DefenderSave, SaveKind,
};
pub use weapon::{
    expected_outcome, parse_rapid_fire, parse_stat_value, parse_sustained_hits, AttackProfile,
    ExpectedOutcome, StatValue, WeaponStat,
};
