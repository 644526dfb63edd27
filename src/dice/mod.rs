//! Dice notation, the seedable generator and roll evaluation.

pub mod history;
pub mod notation;
pub mod rng;
pub mod roll;

pub use history::RollHistory;
pub use notation::{normalize_quick, parse_dice_expression, DiceExpression, MAX_DICE, QUICK_ROLLS};
pub use rng::{entropy_seed, hash_seed, Mulberry32, Seed};
pub use roll::{roll_dice, roll_expression, roll_expression_with, RollResult};
