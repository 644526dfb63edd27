use serde::{Deserialize, Serialize};

use super::notation::DiceExpression;
use super::rng::{Mulberry32, Seed};
use crate::utils::now_millis;

/// Self-describing outcome of one dice expression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollResult {
    pub expr: String,
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub rolls: Vec<u32>,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
    pub timestamp: u64,
}

impl RollResult {
    pub fn sum(&self) -> i64 {
        self.rolls.iter().map(|&roll| i64::from(roll)).sum()
    }
}

/// Draws `count` dice of `sides` faces from `draw`, which yields values in `[0, 1)`.
/// Results keep draw order; out-of-range draws land on the nearest face.
pub fn roll_dice<F>(count: u32, sides: u32, mut draw: F) -> Vec<u32>
where
    F: FnMut() -> f64,
{
    let top = sides.saturating_sub(1);
    (0..count)
        .map(|_| 1 + ((draw() * f64::from(sides)).floor() as u32).min(top))
        .collect()
}

/// Rolls `expr` on a fresh generator built from `seed`, or from entropy when absent.
pub fn roll_expression(expr: &str, seed: Option<Seed>) -> RollResult {
    let mut rng = Mulberry32::from_seed_value(seed.as_ref());
    let mut result = roll_expression_with(expr, &mut rng);
    result.seed = seed;
    result
}

/// Rolls `expr` on a caller-owned generator, continuing its sequence.
pub fn roll_expression_with(expr: &str, rng: &mut Mulberry32) -> RollResult {
    let parsed = DiceExpression::parse(expr);
    let rolls = roll_dice(parsed.count, parsed.sides, || rng.next_f64());
    let total =
        rolls.iter().map(|&roll| i64::from(roll)).sum::<i64>() + i64::from(parsed.modifier);

    RollResult {
        expr: if parsed.valid {
            expr.to_owned()
        } else {
            parsed.to_string()
        },
        count: parsed.count,
        sides: parsed.sides,
        modifier: parsed.modifier,
        rolls,
        total,
        seed: None,
        timestamp: now_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_draws_hit_both_boundaries() {
        assert_eq!(roll_dice(3, 6, || 0.0), vec![1, 1, 1]);
        assert_eq!(roll_dice(3, 6, || 0.999999), vec![6, 6, 6]);
        assert!(roll_dice(0, 6, || 0.5).is_empty());
    }

    #[test]
    fn out_of_range_draws_stay_on_the_die() {
        assert_eq!(roll_dice(2, 6, || 1.0), vec![6, 6]);
        assert_eq!(roll_dice(1, 6, || 1.5), vec![6]);
        assert_eq!(roll_dice(1, 6, || -0.5), vec![1]);
        assert_eq!(roll_dice(1, 6, || f64::NAN), vec![1]);
        assert_eq!(roll_dice(1, u32::MAX, || 1.0), vec![u32::MAX]);
        assert_eq!(roll_dice(1, 0, || 0.7), vec![1]);
    }

    #[test]
    fn rolls_keep_draw_order() {
        let mut draws = [0.0, 0.5, 0.99].into_iter();
        let rolls = roll_dice(3, 6, || draws.next().unwrap_or(0.0));
        assert_eq!(rolls, vec![1, 4, 6]);
    }

    #[test]
    fn same_seed_same_outcome() {
        let first = roll_expression("1d6", Some(Seed::from("abc")));
        let second = roll_expression("1d6", Some(Seed::from("abc")));
        assert_eq!(first.rolls, second.rolls);
        assert_eq!(first.total, second.total);
        assert_eq!(first.rolls, vec![4]);
        assert_eq!(first.seed, Some(Seed::from("abc")));
    }

    #[test]
    fn seeded_rolls_match_reference_log() {
        let result = roll_expression("3d6+2", Some(Seed::from(42u32)));
        assert_eq!(result.rolls, vec![4, 3, 6]);
        assert_eq!(result.total, 15);
        assert_eq!(result.expr, "3d6+2");

        let phase = roll_expression("10d6", Some(Seed::from("combat-phase-1")));
        assert_eq!(phase.rolls, vec![3, 1, 2, 2, 4, 6, 5, 1, 1, 3]);
        assert_eq!(phase.total, 28);
    }

    #[test]
    fn unseeded_rolls_differ() {
        let first = roll_expression("20d20", None);
        let second = roll_expression("20d20", None);
        assert_ne!(first.rolls, second.rolls);
        assert_eq!(first.seed, None);
    }

    #[test]
    fn totals_and_bounds_hold_for_valid_expressions() {
        for (index, expr) in ["1d6", "2d6+3", "4d8-9", "12d3", "3d20+1", "1d2"].iter().enumerate() {
            let parsed = DiceExpression::parse(expr);
            let result = roll_expression(expr, Some(Seed::from(index as u32 * 7919)));
            assert_eq!(result.rolls.len(), parsed.count as usize);
            assert_eq!(result.total, result.sum() + i64::from(parsed.modifier));
            assert!(result
                .rolls
                .iter()
                .all(|&roll| (1..=parsed.sides).contains(&roll)));
        }
    }

    #[test]
    fn malformed_expression_reports_canonical_fallback() {
        let result = roll_expression("garbage", Some(Seed::from(42u32)));
        assert_eq!(result.expr, "1d6");
        assert_eq!(result.rolls, vec![4]);
        assert_eq!(result.total, 4);
        assert!(DiceExpression::parse(&result.expr).valid);
    }

    #[test]
    fn shared_generator_continues_sequence() {
        let mut rng = Mulberry32::from_seed_value(Some(&Seed::from(42u32)));
        let first = roll_expression_with("1d6", &mut rng);
        let second = roll_expression_with("2d6", &mut rng);
        assert_eq!(first.rolls, vec![4]);
        assert_eq!(second.rolls, vec![3, 6]);
    }

    #[test]
    fn result_serializes_without_absent_seed() {
        let mut result = roll_expression("1d6", Some(Seed::from(7u32)));
        result.timestamp = 0;
        result.seed = None;
        let json = serde_json::to_string(&result).expect("roll result should serialize");
        assert!(!json.contains("seed"));
        let back: RollResult = serde_json::from_str(&json).expect("roll result should parse");
        assert_eq!(back, result);
    }
}
