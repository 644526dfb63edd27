use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::geometry::{clamp, Rect, Region, Span};

/// Top/bottom strips reserved for reordering: 10% of the height, kept within 10..16px.
const REORDER_EDGE_RATIO: f64 = 0.1;
const REORDER_EDGE_MIN: f64 = 10.0;
const REORDER_EDGE_MAX: f64 = 16.0;

const CENTER_MARGIN: f64 = 0.3;

const ESCORT_TOP: f64 = 0.6;
const ESCORT_BOTTOM_RATIO: f64 = 0.15;
const ESCORT_BOTTOM_MIN: f64 = 16.0;
const ESCORT_BOTTOM_MAX: f64 = 28.0;
const ESCORT_MARGIN: f64 = 0.4;

const ESCORT_PRE_FREEZE_MARGIN: f64 = 0.3;
const ESCORT_PRE_FREEZE_TOP: f64 = 0.55;
const ESCORT_PRE_FREEZE_BOTTOM: f64 = 0.85;

const DEEP_FREEZE_MARGIN_X: f64 = 0.4;
const DEEP_FREEZE_MARGIN_Y: f64 = 0.45;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    #[default]
    Hover,
    Drop,
}

impl FromStr for DragMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hover" | "move" => Ok(DragMode::Hover),
            "drop" | "release" => Ok(DragMode::Drop),
            _ => Err(()),
        }
    }
}

/// Unknown or non-string modes read as `Hover`.
impl<'de> Deserialize<'de> for DragMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default())
    }
}

// Role flags follow JavaScript truthiness so `null`, `0` and `""` read as false.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let flag = match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().map_or(false, |number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    Ok(flag)
}

/// Role flags for one classification call.
///
/// `mode` is carried for callers that distinguish hover from drop; both are
/// classified the same way today.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HotspotOptions {
    #[serde(default, deserialize_with = "truthy")]
    pub dragged_is_leader: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub candidate_is_leader: bool,
    #[serde(default)]
    pub mode: DragMode,
}

impl HotspotOptions {
    pub fn new(dragged_is_leader: bool, candidate_is_leader: bool) -> Self {
        Self {
            dragged_is_leader,
            candidate_is_leader,
            mode: DragMode::Hover,
        }
    }

    pub fn with_mode(mut self, mode: DragMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn policy(&self) -> HotspotPolicy {
        HotspotPolicy::for_roles(self.dragged_is_leader, self.candidate_is_leader)
    }
}

/// Geometric band set selected by the role pairing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HotspotPolicy {
    /// Central 40% of the width between the reorder edge bands.
    Center,
    /// Rank-and-file dragged onto a leader: only the lower escort band attaches.
    Escort,
}

impl HotspotPolicy {
    pub fn for_roles(dragged_is_leader: bool, candidate_is_leader: bool) -> Self {
        match (dragged_is_leader, candidate_is_leader) {
            (false, true) => HotspotPolicy::Escort,
            _ => HotspotPolicy::Center,
        }
    }

    pub fn attach_region(self, rect: &Rect) -> Region {
        match self {
            HotspotPolicy::Center => center_region(rect),
            HotspotPolicy::Escort => {
                let height = rect.height();
                let top = rect.top + height * ESCORT_TOP;
                let bottom = rect.bottom
                    - clamp(
                        height * ESCORT_BOTTOM_RATIO,
                        ESCORT_BOTTOM_MIN,
                        ESCORT_BOTTOM_MAX,
                    );
                Region::new(rect.inset_x(ESCORT_MARGIN), Span::closed(top, bottom))
            }
        }
    }

    pub fn pre_freeze_region(self, rect: &Rect) -> Region {
        match self {
            HotspotPolicy::Center => center_region(rect),
            HotspotPolicy::Escort => {
                let height = rect.height();
                Region::new(
                    rect.inset_x(ESCORT_PRE_FREEZE_MARGIN),
                    Span::closed(
                        rect.top + height * ESCORT_PRE_FREEZE_TOP,
                        rect.top + height * ESCORT_PRE_FREEZE_BOTTOM,
                    ),
                )
            }
        }
    }
}

/// Height of each reorder edge band for `rect`.
pub fn reorder_edge(rect: &Rect) -> f64 {
    clamp(
        rect.height() * REORDER_EDGE_RATIO,
        REORDER_EDGE_MIN,
        REORDER_EDGE_MAX,
    )
}

// A point on an edge-band boundary belongs to the band.
fn reorder_interior(rect: &Rect) -> Span {
    let edge = reorder_edge(rect);
    Span::open(rect.top + edge, rect.bottom - edge)
}

fn center_region(rect: &Rect) -> Region {
    Region::new(rect.inset_x(CENTER_MARGIN), reorder_interior(rect))
}

pub fn deep_freeze_region(rect: &Rect) -> Region {
    Region::new(
        rect.inset_x(DEEP_FREEZE_MARGIN_X),
        rect.inset_y(DEEP_FREEZE_MARGIN_Y),
    )
}

pub fn in_attach_hotspot(px: f64, py: f64, rect: Option<&Rect>, options: HotspotOptions) -> bool {
    rect.map_or(false, |rect| {
        options.policy().attach_region(rect).contains(px, py)
    })
}

/// Looser than the attach hotspot; lets the caller hold a target while the
/// pointer is still approaching it.
pub fn in_pre_freeze_zone(px: f64, py: f64, rect: Option<&Rect>, options: HotspotOptions) -> bool {
    rect.map_or(false, |rect| {
        options.policy().pre_freeze_region(rect).contains(px, py)
    })
}

/// Fixed central lock region, independent of roles. It never reaches into the
/// reorder edge bands, which keeps it inside the centre hotspot even on very
/// short cards.
pub fn in_deep_freeze_zone(px: f64, py: f64, rect: Option<&Rect>) -> bool {
    rect.map_or(false, |rect| {
        deep_freeze_region(rect).contains(px, py) && reorder_interior(rect).contains(py)
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Reorder,
    Attach,
    None,
}

pub fn classify(px: f64, py: f64, rect: Option<&Rect>, options: HotspotOptions) -> Zone {
    match rect {
        None => Zone::None,
        Some(rect) if in_attach_hotspot(px, py, Some(rect), options) => Zone::Attach,
        Some(rect) if rect.contains(px, py) => Zone::Reorder,
        Some(_) => Zone::None,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneReport {
    pub zone: Zone,
    pub pre_freeze: bool,
    pub deep_freeze: bool,
}

/// Runs every predicate for one pointer frame.
pub fn probe(px: f64, py: f64, rect: Option<&Rect>, options: HotspotOptions) -> ZoneReport {
    ZoneReport {
        zone: classify(px, py, rect, options),
        pre_freeze: in_pre_freeze_zone(px, py, rect, options),
        deep_freeze: in_deep_freeze_zone(px, py, rect),
    }
}
