use swivel_traits::{
    EventTrackingRegions, LayoutPoint, LayoutRect, LayoutSize, ScrollBehaviorForFixedElements,
    ScrollOffsetRange, ScrollingLayerPositionAction, ScrollingNodeID, ScrollingNodeType,
    SynchronousScrollingReasons,
};

use crate::constraints::{FixedConstraints, StickyConstraints};
use crate::layer::GraphicsLayer;

/// A scroll position requested by the main thread, waiting to be sent to the
/// scrolling thread at the next commit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequestedScrollPosition {
    pub position: LayoutPoint,
    pub programmatic: bool,
}

/// Scroll geometry shared by frame-scrolling and overflow-scrolling nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollingState {
    pub scroll_origin: LayoutPoint,
    pub scroll_position: LayoutPoint,
    pub requested_scroll_position: Option<RequestedScrollPosition>,
    pub total_contents_size: LayoutSize,
    pub reachable_contents_size: LayoutSize,
    pub scrollable_area_size: LayoutSize,
    /// Snap offsets and ranges, already snapped to device pixels.
    pub horizontal_snap_offsets: Vec<f32>,
    pub vertical_snap_offsets: Vec<f32>,
    pub horizontal_snap_offset_ranges: Vec<ScrollOffsetRange>,
    pub vertical_snap_offset_ranges: Vec<ScrollOffsetRange>,
    pub current_horizontal_snap_point_index: Option<usize>,
    pub current_vertical_snap_point_index: Option<usize>,
}

/// Extra state carried only by frame-scrolling nodes.
#[derive(Clone, Debug, Default)]
pub struct FrameScrollingState {
    pub scrolling: ScrollingState,
    pub frame_scale_factor: f32,
    pub header_height: f32,
    pub footer_height: f32,
    pub top_content_inset: f32,
    pub layout_viewport: LayoutRect,
    pub min_layout_viewport_origin: LayoutPoint,
    pub max_layout_viewport_origin: LayoutPoint,
    pub visual_viewport_enabled: bool,
    pub scroll_behavior_for_fixed_elements: ScrollBehaviorForFixedElements,
    pub fixed_elements_layout_relative_to_frame: bool,
    pub synchronous_scrolling_reasons: SynchronousScrollingReasons,
    pub event_tracking_regions: EventTrackingRegions,
    pub expects_wheel_event_test_trigger: bool,
    pub scrolled_contents_layer: Option<GraphicsLayer>,
    pub counter_scrolling_layer: Option<GraphicsLayer>,
    pub inset_clip_layer: Option<GraphicsLayer>,
    pub content_shadow_layer: Option<GraphicsLayer>,
    pub header_layer: Option<GraphicsLayer>,
    pub footer_layer: Option<GraphicsLayer>,
}

/// Extra state carried only by overflow-scrolling nodes.
#[derive(Clone, Debug, Default)]
pub struct OverflowScrollingState {
    pub scrolling: ScrollingState,
    pub scrolled_contents_layer: Option<GraphicsLayer>,
}

/// Per-kind payload of a scrolling state node. The set of kinds is closed
/// and exhaustively matched throughout the coordinator.
#[derive(Clone, Debug)]
pub enum ScrollingStateNodeKind {
    FrameScrolling(FrameScrollingState),
    OverflowScrolling(OverflowScrollingState),
    Fixed(FixedConstraints),
    Sticky(StickyConstraints),
}

impl ScrollingStateNodeKind {
    fn new(node_type: ScrollingNodeType) -> Self {
        match node_type {
            ScrollingNodeType::FrameScrolling => {
                ScrollingStateNodeKind::FrameScrolling(FrameScrollingState::default())
            }
            ScrollingNodeType::OverflowScrolling => {
                ScrollingStateNodeKind::OverflowScrolling(OverflowScrollingState::default())
            }
            ScrollingNodeType::Fixed => ScrollingStateNodeKind::Fixed(FixedConstraints::default()),
            ScrollingNodeType::Sticky => {
                ScrollingStateNodeKind::Sticky(StickyConstraints::default())
            }
        }
    }
}

/// One node of the scrolling state tree: a scrollable or
/// viewport-constrained region, its geometry, and the layer handle the
/// coordinator repositions.
#[derive(Clone, Debug)]
pub struct ScrollingStateNode {
    id: ScrollingNodeID,
    parent: Option<ScrollingNodeID>,
    pub(super) children: Vec<ScrollingNodeID>,
    pub layer: Option<GraphicsLayer>,
    pub(super) changed: bool,
    pub kind: ScrollingStateNodeKind,
}

impl ScrollingStateNode {
    pub(super) fn new(
        node_type: ScrollingNodeType,
        id: ScrollingNodeID,
        parent: Option<ScrollingNodeID>,
    ) -> Self {
        ScrollingStateNode {
            id,
            parent,
            children: Vec::new(),
            layer: None,
            changed: true,
            kind: ScrollingStateNodeKind::new(node_type),
        }
    }

    pub fn id(&self) -> ScrollingNodeID {
        self.id
    }

    pub fn parent(&self) -> Option<ScrollingNodeID> {
        self.parent
    }

    pub fn children(&self) -> &[ScrollingNodeID] {
        &self.children
    }

    pub fn node_type(&self) -> ScrollingNodeType {
        match self.kind {
            ScrollingStateNodeKind::FrameScrolling(_) => ScrollingNodeType::FrameScrolling,
            ScrollingStateNodeKind::OverflowScrolling(_) => ScrollingNodeType::OverflowScrolling,
            ScrollingStateNodeKind::Fixed(_) => ScrollingNodeType::Fixed,
            ScrollingStateNodeKind::Sticky(_) => ScrollingNodeType::Sticky,
        }
    }

    pub fn is_frame_scrolling(&self) -> bool {
        matches!(self.kind, ScrollingStateNodeKind::FrameScrolling(_))
    }

    /// Whether this node carries changes the next commit must pick up.
    pub fn has_changed_properties(&self) -> bool {
        self.changed
    }

    /// Shared scroll geometry, present on frame- and overflow-scrolling
    /// nodes only.
    pub fn scrolling_state(&self) -> Option<&ScrollingState> {
        match &self.kind {
            ScrollingStateNodeKind::FrameScrolling(state) => Some(&state.scrolling),
            ScrollingStateNodeKind::OverflowScrolling(state) => Some(&state.scrolling),
            _ => None,
        }
    }

    pub fn scrolling_state_mut(&mut self) -> Option<&mut ScrollingState> {
        match &mut self.kind {
            ScrollingStateNodeKind::FrameScrolling(state) => Some(&mut state.scrolling),
            ScrollingStateNodeKind::OverflowScrolling(state) => Some(&mut state.scrolling),
            _ => None,
        }
    }

    pub fn frame_scrolling_state(&self) -> Option<&FrameScrollingState> {
        match &self.kind {
            ScrollingStateNodeKind::FrameScrolling(state) => Some(state),
            _ => None,
        }
    }

    pub fn frame_scrolling_state_mut(&mut self) -> Option<&mut FrameScrollingState> {
        match &mut self.kind {
            ScrollingStateNodeKind::FrameScrolling(state) => Some(state),
            _ => None,
        }
    }

    pub fn overflow_scrolling_state_mut(&mut self) -> Option<&mut OverflowScrollingState> {
        match &mut self.kind {
            ScrollingStateNodeKind::OverflowScrolling(state) => Some(state),
            _ => None,
        }
    }

    /// Repositions this node's layer for a new viewport rect, if the node is
    /// viewport-constrained. Scrolling nodes are untouched; their layers are
    /// driven by the scroll reconciliation path instead.
    pub(super) fn reconcile_layer_position_for_viewport_rect(
        &self,
        viewport_rect: &LayoutRect,
        action: ScrollingLayerPositionAction,
    ) {
        let position = match &self.kind {
            ScrollingStateNodeKind::Fixed(constraints) => {
                Some(constraints.layer_position_for_viewport_rect(viewport_rect))
            }
            ScrollingStateNodeKind::Sticky(constraints) => {
                Some(constraints.layer_position_for_constraining_rect(viewport_rect))
            }
            _ => None,
        };
        if let (Some(position), Some(layer)) = (position, &self.layer) {
            layer.update_position(position, action);
        }
    }
}
