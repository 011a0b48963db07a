//! Asynchronous scrolling coordination for a compositing web engine.
//!
//! Scrolling happens off the main thread; layout does not. This crate keeps
//! the two sides agreeing: the main thread describes its scrollable and
//! viewport-constrained layers in a [`ScrollingStateTree`], commits the
//! dirty subset before each paint, and the [`AsyncScrollingCoordinator`]
//! folds the scroll positions the scrolling thread reports back into frame
//! views, overflow areas, and compositing layers.

mod constraints;
mod coordinator;
mod errors;
mod frame;
mod layer;
mod timer;
mod tree;
mod wheel_event_monitor;

pub use constraints::{AnchorEdges, FixedConstraints, StickyConstraints, ViewportConstraints};
pub use coordinator::{
    AsyncScrollingCoordinator, LayoutViewportOriginOrOverrideRect, ScheduledScrollUpdate,
};
pub use errors::{Error, Result};
pub use frame::{
    CacheState, Frame, FrameView, FrameViewLayers, Page, TriggerLayout,
    constrain_scroll_position_for_overhang,
};
pub use layer::{CommitClock, GraphicsLayer};
pub use timer::OneShotTimer;
pub use tree::{
    FrameScrollingState, OverflowScrollingState, RequestedScrollPosition, ScrollingState,
    ScrollingStateNode, ScrollingStateNodeKind, ScrollingStateTree,
};
pub use wheel_event_monitor::{DeferReason, ScrollableAreaIdentifier, WheelEventTestMonitor};
