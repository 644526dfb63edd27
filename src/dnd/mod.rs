//! Pointer-to-zone classification for dragging leader and unit cards.

pub mod geometry;
pub mod hotspot;

pub use geometry::{Rect, Region, Span};
pub use hotspot::{
    classify, in_attach_hotspot, in_deep_freeze_zone, in_pre_freeze_zone, probe, DragMode,
    HotspotOptions, HotspotPolicy, Zone, ZoneReport,
};
