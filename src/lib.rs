pub mod combat;
pub mod dice;
pub mod dnd;
pub mod error;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Array, Function, Object, Promise, Reflect};

pub use combat::{
    compute_defender_save, expected_outcome, parse_stat_value, wound_target, AttackProfile,
    DefenderSave, ExpectedOutcome, SaveKind, StatValue, WeaponStat,
};
pub use dice::{
    normalize_quick, parse_dice_expression, roll_dice, roll_expression, roll_expression_with,
    DiceExpression, Mulberry32, RollHistory, RollResult, Seed, MAX_DICE, QUICK_ROLLS,
};
pub use dnd::{
    classify, in_attach_hotspot, in_deep_freeze_zone, in_pre_freeze_zone, probe, DragMode,
    HotspotOptions, HotspotPolicy, Rect, Zone, ZoneReport,
};
pub use error::{CoreError, DiceError};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::log(&format!("roster_core {} ready", env!("CARGO_PKG_VERSION")));
}

fn to_js_error(error: CoreError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn decode<T: DeserializeOwned>(field: &str, value: JsValue) -> Result<T, JsValue> {
    from_value(value).map_err(|error| to_js_error(CoreError::invalid_input(field, error)))
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|error| to_js_error(CoreError::encoding(error)))
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|error| to_js_error(CoreError::encoding(error)))
}

fn read_rect(value: JsValue) -> Result<Option<Rect>, JsValue> {
    decode("rect", value)
}

fn read_options(value: JsValue) -> Result<HotspotOptions, JsValue> {
    decode::<Option<HotspotOptions>>("options", value).map(Option::unwrap_or_default)
}

/// Numbers seed directly; any other non-null value seeds through its string form.
fn seed_from_js(value: &JsValue) -> Option<Seed> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    if let Some(number) = value.as_f64() {
        return Some(Seed::Number(number));
    }
    if let Some(text) = value.as_string() {
        return Some(Seed::Text(text));
    }
    Some(Seed::Text(String::from(
        Object::from(value.clone()).to_string(),
    )))
}

/// Reads `{ seed }` roll options. A bare number or string is taken as the seed itself.
fn roll_seed_from_js(options: &JsValue) -> Option<Seed> {
    if options.is_object() && !Array::is_array(options) {
        let seed = Reflect::get(options, &JsValue::from_str("seed")).ok()?;
        return seed_from_js(&seed);
    }
    seed_from_js(options)
}

// An emptied seed field on the tray means "roll fresh", not "hash the empty string".
fn tray_seed_from_js(value: &JsValue) -> Option<Seed> {
    seed_from_js(value).filter(|seed| !seed.is_blank())
}

fn save_from_js(value: &JsValue) -> Option<u8> {
    value
        .as_f64()
        .map(|number| number.to_string())
        .or_else(|| value.as_string())
        .and_then(|raw| combat::parse_save(&raw))
}

fn ap_from_js(value: &JsValue) -> i32 {
    match (value.as_f64(), value.as_string()) {
        (Some(number), _) if number.is_finite() => number.trunc() as i32,
        (_, Some(text)) => combat::parse_ap(&text),
        _ => 0,
    }
}

fn text_from_js(value: &JsValue) -> String {
    if Array::is_array(value) {
        let items: Vec<String> = Array::from(value)
            .iter()
            .filter_map(|item| item.as_string())
            .collect();
        items.join(" ")
    } else {
        value.as_string().unwrap_or_default()
    }
}

#[wasm_bindgen(js_name = "inAttachHotspot")]
pub fn in_attach_hotspot_js(
    px: f64,
    py: f64,
    rect: JsValue,
    options: JsValue,
) -> Result<bool, JsValue> {
    let rect = read_rect(rect)?;
    Ok(in_attach_hotspot(px, py, rect.as_ref(), read_options(options)?))
}

#[wasm_bindgen(js_name = "inPreFreezeZone")]
pub fn in_pre_freeze_zone_js(
    px: f64,
    py: f64,
    rect: JsValue,
    options: JsValue,
) -> Result<bool, JsValue> {
    let rect = read_rect(rect)?;
    Ok(in_pre_freeze_zone(px, py, rect.as_ref(), read_options(options)?))
}

#[wasm_bindgen(js_name = "inDeepFreezeZone")]
pub fn in_deep_freeze_zone_js(px: f64, py: f64, rect: JsValue) -> Result<bool, JsValue> {
    let rect = read_rect(rect)?;
    Ok(in_deep_freeze_zone(px, py, rect.as_ref()))
}

/// Returns `"attach"`, `"reorder"` or `"none"`.
#[wasm_bindgen(js_name = "classifyPointer")]
pub fn classify_pointer(
    px: f64,
    py: f64,
    rect: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let rect = read_rect(rect)?;
    encode(&classify(px, py, rect.as_ref(), read_options(options)?))
}

/// Zone plus both freeze flags for one pointer frame.
#[wasm_bindgen(js_name = "probePointer")]
pub fn probe_pointer(
    px: f64,
    py: f64,
    rect: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let rect = read_rect(rect)?;
    encode(&probe(px, py, rect.as_ref(), read_options(options)?))
}

#[wasm_bindgen(js_name = "parseDiceExpression")]
pub fn parse_dice_expression_js(expr: Option<String>) -> Result<JsValue, JsValue> {
    encode(&parse_dice_expression(expr.as_deref()))
}

/// Strict variant of `parseDiceExpression`: rejects anything that is not dice notation.
#[wasm_bindgen(js_name = "parseDiceNotation")]
pub fn parse_dice_notation(expr: &str) -> Result<JsValue, JsValue> {
    let parsed = expr
        .parse::<DiceExpression>()
        .map_err(|error| to_js_error(CoreError::from(error)))?;
    encode(&parsed)
}

/// Rolls with a caller-supplied `() => number` source, or with fresh entropy.
/// At most `MAX_DICE` dice are rolled per call.
#[wasm_bindgen(js_name = "rollDice")]
pub fn roll_dice_js(count: u32, sides: u32, rng: Option<Function>) -> Result<Vec<u32>, JsValue> {
    if count > MAX_DICE {
        utils::warn(&format!("rollDice: {count} dice requested, rolling {MAX_DICE}"));
    }
    let count = count.min(MAX_DICE);
    match rng {
        Some(rng) => {
            let draws = (0..count)
                .map(|_| {
                    rng.call0(&JsValue::NULL)
                        .map(|value| value.as_f64().unwrap_or(0.0))
                })
                .collect::<Result<Vec<f64>, JsValue>>()?;
            let mut draws = draws.into_iter();
            Ok(roll_dice(count, sides, || draws.next().unwrap_or(0.0)))
        }
        None => {
            let mut generator = Mulberry32::from_seed_value(None);
            Ok(roll_dice(count, sides, || generator.next_f64()))
        }
    }
}

/// `options` is `{ seed }`; without a seed the roll draws fresh entropy.
#[wasm_bindgen(js_name = "rollExpression")]
pub fn roll_expression_js(expr: Option<String>, options: JsValue) -> Result<JsValue, JsValue> {
    let result = roll_expression(
        expr.as_deref().unwrap_or_default(),
        roll_seed_from_js(&options),
    );
    encode(&result)
}

/// Resolves with a roll after `delay_ms`, giving the tray time to animate.
#[wasm_bindgen(js_name = "rollExpressionAfter")]
pub fn roll_expression_after(
    expr: Option<String>,
    options: JsValue,
    delay_ms: Option<u32>,
) -> Promise {
    let seed = roll_seed_from_js(&options);
    let delay = delay_ms.unwrap_or(0);

    future_to_promise(async move {
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let result = roll_expression(expr.as_deref().unwrap_or_default(), seed);
        encode(&result)
    })
}

#[wasm_bindgen(js_name = "normalizeQuickRoll")]
pub fn normalize_quick_roll(preset: &str) -> String {
    normalize_quick(preset)
}

#[wasm_bindgen(js_name = "quickRolls")]
pub fn quick_rolls() -> Result<JsValue, JsValue> {
    encode(&QUICK_ROLLS[..])
}

/// Dice tray session: an optional shared seed and the recent roll log.
#[wasm_bindgen]
pub struct DiceTray {
    seed: Option<Seed>,
    history: RollHistory,
}

#[wasm_bindgen]
impl DiceTray {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: JsValue, capacity: Option<usize>) -> DiceTray {
        let history = capacity
            .map(RollHistory::with_capacity)
            .unwrap_or_default();
        DiceTray {
            seed: tray_seed_from_js(&seed),
            history,
        }
    }

    #[wasm_bindgen(js_name = "setSeed")]
    pub fn set_seed(&mut self, seed: JsValue) {
        self.seed = tray_seed_from_js(&seed);
    }

    pub fn roll(&mut self, expr: &str) -> Result<JsValue, JsValue> {
        let result = self.record(expr);
        encode(&result)
    }

    #[wasm_bindgen(js_name = "rollJson")]
    pub fn roll_json(&mut self, expr: &str) -> Result<String, JsValue> {
        let result = self.record(expr);
        encode_json(&result)
    }

    #[wasm_bindgen(js_name = "rollQuick")]
    pub fn roll_quick(&mut self, preset: &str) -> Result<JsValue, JsValue> {
        let result = self.record(&normalize_quick(preset));
        encode(&result)
    }

    pub fn history(&self) -> Result<JsValue, JsValue> {
        encode(&self.history.iter().collect::<Vec<_>>())
    }

    #[wasm_bindgen(js_name = "historyJson")]
    pub fn history_json(&self) -> Result<String, JsValue> {
        encode_json(&self.history.iter().collect::<Vec<_>>())
    }

    #[wasm_bindgen(js_name = "clearHistory")]
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[wasm_bindgen(js_name = "isEmpty")]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl DiceTray {
    fn record(&mut self, expr: &str) -> RollResult {
        if !DiceExpression::parse(expr).valid {
            utils::warn(&format!("`{expr}` is not dice notation, rolling 1d6"));
        }
        let result = roll_expression(expr, self.seed.clone());
        self.history.push(result.clone());
        result
    }
}

#[wasm_bindgen(js_name = "woundTarget")]
pub fn wound_target_js(strength: u32, toughness: u32) -> Option<u8> {
    wound_target(strength, toughness)
}

#[wasm_bindgen(js_name = "probabilityFromTarget")]
pub fn probability_from_target_js(target: u8) -> Option<f64> {
    combat::probability_from_target(target)
}

#[wasm_bindgen(js_name = "explainWoundRule")]
pub fn explain_wound_rule_js(strength: u32, toughness: u32) -> Option<String> {
    combat::explain_wound_rule(strength, toughness).map(str::to_owned)
}

#[wasm_bindgen(js_name = "parseAp")]
pub fn parse_ap_js(ap: JsValue) -> i32 {
    ap_from_js(&ap)
}

#[wasm_bindgen(js_name = "bestSaveTargetAfterAp")]
pub fn best_save_target_after_ap_js(
    armour_save: JsValue,
    ap: JsValue,
    invuln_save: JsValue,
) -> Option<u8> {
    combat::best_save_target_after_ap(
        save_from_js(&armour_save),
        ap_from_js(&ap),
        save_from_js(&invuln_save),
    )
}

#[wasm_bindgen(js_name = "computeDefenderSave")]
pub fn compute_defender_save_js(
    armour_save: JsValue,
    ap: JsValue,
    invuln_save: JsValue,
) -> Result<JsValue, JsValue> {
    encode(&compute_defender_save(
        save_from_js(&armour_save),
        ap_from_js(&ap),
        save_from_js(&invuln_save),
    ))
}

/// Accepts a number or notation text such as `D6+1`.
#[wasm_bindgen(js_name = "parseStatValue")]
pub fn parse_stat_value_js(value: JsValue) -> Result<JsValue, JsValue> {
    let stat = decode::<Option<WeaponStat>>("value", value)?
        .map(|stat| stat.value())
        .unwrap_or_default();
    encode(&stat)
}

#[wasm_bindgen(js_name = "parseRapidFire")]
pub fn parse_rapid_fire_js(weapon_type: JsValue) -> u32 {
    combat::parse_rapid_fire(&text_from_js(&weapon_type))
}

/// Accepts a type string or an array of keywords.
#[wasm_bindgen(js_name = "parseSustainedHits")]
pub fn parse_sustained_hits_js(keywords: JsValue) -> u32 {
    combat::parse_sustained_hits(&text_from_js(&keywords))
}

#[wasm_bindgen(js_name = "expectedOutcome")]
pub fn expected_outcome_js(profile: JsValue) -> Result<JsValue, JsValue> {
    let profile: AttackProfile = decode("profile", profile)?;
    encode(&expected_outcome(&profile))
}
