//! Shared vocabulary between the swivel scrolling coordinator and the
//! subsystems it collaborates with: node identifiers, typed geometry units,
//! the scrolling-thread message contract, and the narrow traits through
//! which the coordinator talks to the rest of the engine.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub mod messages;
pub mod units;

pub use messages::{
    ScrollingThreadMsg, ScrollingThreadProxy, ScrollingThreadReceiver, scrolling_thread_channel,
};
pub use units::{
    DevicePixel, DeviceScale, LayoutPixel, LayoutPoint, LayoutRect, LayoutSize, LayoutVector2D,
    round_to_device_pixel,
};

/// Identifies one scrolling state node. Stable for the lifetime of the
/// corresponding scrollable layer; never reused within a commit window.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct ScrollingNodeID(pub u64);

impl std::fmt::Display for ScrollingNodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one frame in the page's frame tree.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct FrameId(pub u64);

/// The role a scrolling state node plays in the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScrollingNodeType {
    /// Scrolls a whole frame (the main frame or a subframe).
    FrameScrolling,
    /// Scrolls an overflow area inside a frame.
    OverflowScrolling,
    /// A fixed-positioned element's layer.
    Fixed,
    /// A sticky-positioned element's layer.
    Sticky,
}

/// Write priority for repositioning a compositing layer.
///
/// `Set` is an authoritative overwrite (programmatic scrolls, explicit
/// commits). `Sync` is a best-effort write that must not stomp on a more
/// authoritative write from the layout side landing in the same commit; the
/// two differ in conflict priority, not in the computed value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScrollingLayerPositionAction {
    /// Unconditional, authoritative write.
    Set,
    /// Conflict-aware synchronization toward the value.
    Sync,
}

/// Whether the viewport rect can be trusted for layout purposes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ViewportRectStability {
    /// The viewport is at rest; layout may be triggered from it.
    Stable,
    /// Mid-gesture; do not thrash layout.
    Unstable,
    /// The obscured insets are changing interactively; override rects must
    /// not be installed until the gesture settles.
    ChangingObscuredInsetsInteractively,
}

/// Scroll axis selector for per-axis snap bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScrollEventAxis {
    Horizontal,
    Vertical,
}

/// How fixed elements behave when the document is overscrolled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScrollBehaviorForFixedElements {
    /// Fixed elements stick to the document edge during rubber-banding.
    #[default]
    StickToDocumentBounds,
    /// Fixed elements follow the viewport out of bounds.
    StickToViewportBounds,
}

/// A start/end pair between two adjacent snap offsets within which scrolling
/// may come to rest freely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffsetRange {
    pub start: f32,
    pub end: f32,
}

bitflags::bitflags! {
    /// Reasons forcing a frame back to synchronous main-thread scrolling.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    pub struct SynchronousScrollingReasons: u32 {
        const FORCED_ON_MAIN_THREAD = 1 << 0;
        const HAS_VIEWPORT_CONSTRAINED_OBJECTS_WITHOUT_SUPPORTED_CONTENTS = 1 << 1;
        const HAS_NON_LAYER_VIEWPORT_CONSTRAINED_OBJECTS = 1 << 2;
        const IS_IMAGE_DOCUMENT = 1 << 3;
        const HAS_SLOW_REPAINT_OBJECTS = 1 << 4;
    }
}

/// DOM regions whose events must be dispatched synchronously, plus the
/// region where asynchronous dispatch is allowed. Comparable so a commit can
/// skip re-sending unchanged regions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTrackingRegions {
    /// Region where events can be handled asynchronously.
    pub asynchronous_region: Vec<LayoutRect>,
    /// Per-event-name regions requiring synchronous dispatch.
    pub event_specific_synchronous_regions: Vec<(String, Vec<LayoutRect>)>,
}

/// Scroll geometry captured by the layout/compositing-update pass for one
/// scrolling node. Snap offsets are still in layout units here; the
/// coordinator snaps them to device pixels before they reach the state tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollingGeometry {
    pub scroll_origin: LayoutPoint,
    pub scroll_position: LayoutPoint,
    pub content_size: LayoutSize,
    pub reachable_content_size: LayoutSize,
    pub scrollable_area_size: LayoutSize,
    pub horizontal_snap_offsets: Vec<f32>,
    pub vertical_snap_offsets: Vec<f32>,
    pub horizontal_snap_offset_ranges: Vec<ScrollOffsetRange>,
    pub vertical_snap_offset_ranges: Vec<ScrollOffsetRange>,
    pub current_horizontal_snap_point_index: Option<usize>,
    pub current_vertical_snap_point_index: Option<usize>,
}

/// An overflow scrolling region owned by a frame view. The coordinator
/// applies reconciled offsets through this interface without knowing
/// anything about the underlying render object.
pub trait ScrollableArea {
    /// Current scroll offset of the area.
    fn scroll_offset(&self) -> LayoutPoint;

    /// Applies an offset directly, bypassing any scroll animation.
    fn scroll_to_offset_without_animation(&mut self, offset: LayoutPoint);

    /// Brackets offset application so nested logic can distinguish
    /// user-driven from programmatic scrolls.
    fn set_is_user_scroll(&mut self, is_user_scroll: bool);

    /// Records the resting snap point index per axis.
    fn set_current_snap_indices(&mut self, horizontal: Option<usize>, vertical: Option<usize>);
}

/// Editing UI owner; must reposition any active selection or composition UI
/// when an overflow area is authoritatively scrolled under it.
pub trait EditorClient {
    fn overflow_scroll_position_changed(&self);
}

/// A scrolling event worth reporting to the embedder's telemetry sink.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScrollingEvent {
    /// Area (square device pixels) exposed without ready tiles.
    ExposedTilelessArea(u64),
    /// The frame switched scrolling modes for the given reasons.
    SwitchedScrollingMode(SynchronousScrollingReasons),
}

/// Telemetry sink for scrolling performance events. Purely observational;
/// implementations must not block.
pub trait ScrollingPerformanceLogger {
    fn log_scrolling_event(&self, event: ScrollingEvent, timestamp: SystemTime);
}
