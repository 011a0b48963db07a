//! The asynchronous scrolling coordinator.
//!
//! The coordinator is the main-thread owner of the scrolling state tree. It
//! collects layout's view of scroll geometry and viewport constraints into
//! the tree, commits the dirty subset before each paint, and absorbs the
//! scroll positions the scrolling thread reports back, reconciling frame
//! views and compositing layers with them. Asynchronous notifications are
//! coalesced through a single pending [`ScheduledScrollUpdate`] slot and a
//! zero-delay one-shot timer, so a burst of per-frame callbacks costs one
//! reconciliation per run-loop turn.

use std::time::{Duration, SystemTime};

use log::{debug, trace, warn};
use swivel_traits::{
    DeviceScale, FrameId, LayoutPoint, LayoutRect, ScrollEventAxis, ScrollOffsetRange,
    ScrollingEvent, ScrollingGeometry, ScrollingLayerPositionAction, ScrollingNodeID,
    ScrollingNodeType, ScrollingThreadMsg, ScrollingThreadProxy, ScrollingThreadReceiver,
    SynchronousScrollingReasons, ViewportRectStability, round_to_device_pixel,
    scrolling_thread_channel,
};

use crate::constraints::ViewportConstraints;
use crate::errors::Result;
use crate::frame::{CacheState, FrameView, Page, TriggerLayout};
use crate::layer::{CommitClock, GraphicsLayer};
use crate::timer::OneShotTimer;
use crate::tree::{ScrollingStateNodeKind, ScrollingStateTree};
use crate::wheel_event_monitor::{DeferReason, ScrollableAreaIdentifier};

/// One pending reconciliation, coalesced until the zero-delay timer fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledScrollUpdate {
    pub node_id: ScrollingNodeID,
    pub scroll_position: LayoutPoint,
    pub layout_viewport_origin: Option<LayoutPoint>,
    pub programmatic: bool,
    pub action: ScrollingLayerPositionAction,
}

impl ScheduledScrollUpdate {
    /// Two updates coalesce when they target the same node with the same
    /// kind of write; only the position and viewport origin may differ.
    fn matches_update_type(&self, other: &ScheduledScrollUpdate) -> bool {
        self.node_id == other.node_id
            && self.programmatic == other.programmatic
            && self.action == other.action
    }
}

/// How a reconciliation describes the layout viewport: a new origin for the
/// base viewport, or a whole override rect pushed in from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutViewportOriginOrOverrideRect {
    Origin(Option<LayoutPoint>),
    OverrideRect(Option<LayoutRect>),
}

pub struct AsyncScrollingCoordinator {
    state_tree: ScrollingStateTree,
    commit_clock: CommitClock,
    update_node_scroll_position_timer: OneShotTimer,
    scheduled_scroll_update: Option<ScheduledScrollUpdate>,
    event_tracking_regions_dirty: bool,
    tree_state_commit_scheduled: bool,
    proxy: ScrollingThreadProxy,
    receiver: ScrollingThreadReceiver,
}

impl AsyncScrollingCoordinator {
    pub fn new() -> Self {
        let (proxy, receiver) = scrolling_thread_channel();
        AsyncScrollingCoordinator {
            state_tree: ScrollingStateTree::new(),
            commit_clock: CommitClock::new(),
            update_node_scroll_position_timer: OneShotTimer::new(),
            scheduled_scroll_update: None,
            event_tracking_regions_dirty: false,
            tree_state_commit_scheduled: false,
            proxy,
            receiver,
        }
    }

    pub fn state_tree(&self) -> &ScrollingStateTree {
        &self.state_tree
    }

    /// Clock the compositing side mints its layer handles against.
    pub fn commit_clock(&self) -> &CommitClock {
        &self.commit_clock
    }

    /// Sender half handed to the scrolling thread.
    pub fn scrolling_thread_proxy(&self) -> ScrollingThreadProxy {
        self.proxy.clone()
    }

    pub fn has_pending_scroll_update(&self) -> bool {
        self.scheduled_scroll_update.is_some()
    }

    // -- Tree mutation ------------------------------------------------------

    /// Inserts a state node for a new scrollable or viewport-constrained
    /// layer. A `parent` of `None` attaches the root.
    pub fn attach_to_state_tree(
        &mut self,
        node_type: ScrollingNodeType,
        new_node_id: ScrollingNodeID,
        parent: Option<ScrollingNodeID>,
    ) -> Result<ScrollingNodeID> {
        let id = self.state_tree.attach_node(node_type, new_node_id, parent)?;
        self.scrolling_state_tree_properties_changed();
        Ok(id)
    }

    pub fn detach_from_state_tree(&mut self, node_id: ScrollingNodeID) {
        self.state_tree.detach_node(node_id);
        self.scrolling_state_tree_properties_changed();
    }

    pub fn clear_state_tree(&mut self) {
        self.state_tree.clear();
        self.scrolling_state_tree_properties_changed();
    }

    fn scrolling_state_tree_properties_changed(&mut self) {
        self.schedule_tree_state_commit();
    }

    fn schedule_tree_state_commit(&mut self) {
        self.tree_state_commit_scheduled = true;
    }

    // -- Commit boundary ----------------------------------------------------

    /// Called once before each paint. Settles dirty event regions into the
    /// root node, then ends the commit window: dirty flags reset, detached
    /// node IDs become reusable, and layer write arbitration starts a fresh
    /// generation.
    pub fn commit_tree_state_if_needed(&mut self, page: &Page) {
        if !self.tree_state_commit_scheduled && !self.state_tree.has_changed_properties() {
            return;
        }
        self.update_event_tracking_regions(page);
        self.state_tree.commit();
        self.commit_clock.begin_commit();
        self.tree_state_commit_scheduled = false;
    }

    /// The computed event regions may not have actually changed; the commit
    /// pass resolves that.
    pub fn set_event_tracking_regions_dirty(&mut self) {
        self.event_tracking_regions_dirty = true;
        self.schedule_tree_state_commit();
    }

    fn update_event_tracking_regions(&mut self, page: &Page) {
        if !self.event_tracking_regions_dirty {
            return;
        }
        let Some(root_id) = self.state_tree.root_node_id() else {
            return;
        };
        let regions = page.event_tracking_regions();
        let unchanged = self
            .state_tree
            .state_node_for_id(root_id)
            .and_then(|node| node.frame_scrolling_state())
            .is_some_and(|state| state.event_tracking_regions == *regions);
        if !unchanged {
            if let Some(state) = self
                .state_tree
                .state_node_mut(root_id)
                .and_then(|node| node.frame_scrolling_state_mut())
            {
                state.event_tracking_regions = regions.clone();
            }
        }
        self.event_tracking_regions_dirty = false;
    }

    // -- Layout-side updates ------------------------------------------------

    /// Mirrors a frame view's post-layout geometry into its state node.
    pub fn frame_view_layout_updated(&mut self, page: &Page, frame_id: FrameId) {
        // Without a root node there is nothing to mirror into yet; layout
        // will call back after the root layer change creates one.
        if self.state_tree.root_state_node().is_none() {
            return;
        }
        self.set_event_tracking_regions_dirty();

        let Some(view) = page.frame(frame_id).and_then(|frame| frame.view()) else {
            return;
        };
        let Some(node_id) = view.scrolling_node_id() else {
            return;
        };

        let visual_viewport_enabled = page.visual_viewport_enabled();
        let expects_trigger = page.expects_wheel_event_test_trigger();
        let device_scale = page.device_scale_factor();

        let Some(state) = self
            .state_tree
            .state_node_mut(node_id)
            .and_then(|node| node.frame_scrolling_state_mut())
        else {
            return;
        };

        state.frame_scale_factor = view.frame_scale_factor();
        state.header_height = view.header_height();
        state.footer_height = view.footer_height();
        state.top_content_inset = view.top_content_inset();

        state.visual_viewport_enabled = visual_viewport_enabled;
        state.layout_viewport = view.layout_viewport_rect();
        state.min_layout_viewport_origin = view.min_stable_layout_viewport_origin();
        state.max_layout_viewport_origin = view.max_stable_layout_viewport_origin();

        state.scrolling.scroll_origin = view.scroll_origin();
        state.scrolling.scrollable_area_size = view.visible_size();
        state.scrolling.total_contents_size = view.total_contents_size();
        state.scrolling.reachable_contents_size = view.total_contents_size();
        state.fixed_elements_layout_relative_to_frame =
            view.fixed_elements_layout_relative_to_frame();
        state.scroll_behavior_for_fixed_elements = view.scroll_behavior_for_fixed_elements();
        state.expects_wheel_event_test_trigger = expects_trigger;

        set_scrolling_state_snap_offsets(
            &mut state.scrolling,
            ScrollEventAxis::Horizontal,
            view.horizontal_snap_offsets(),
            view.horizontal_snap_offset_ranges(),
            device_scale,
        );
        set_scrolling_state_snap_offsets(
            &mut state.scrolling,
            ScrollEventAxis::Vertical,
            view.vertical_snap_offsets(),
            view.vertical_snap_offset_ranges(),
            device_scale,
        );
        state.scrolling.current_horizontal_snap_point_index =
            view.current_horizontal_snap_point_index();
        state.scrolling.current_vertical_snap_point_index =
            view.current_vertical_snap_point_index();
    }

    /// A frame view gained a new root compositing layer: make sure its state
    /// node exists and rebind the frame's auxiliary layer handles.
    pub fn frame_view_root_layer_did_change(&mut self, page: &Page, frame_id: FrameId) {
        let Some(view) = page.frame(frame_id).and_then(|frame| frame.view()) else {
            return;
        };
        let Some(node_id) = view.scrolling_node_id() else {
            return;
        };

        // Subframe nodes are created ahead of time by the compositing
        // update; only the main frame's root node can be missing here.
        if frame_id == page.main_frame().id() {
            self.ensure_root_state_node(node_id);
        }

        let behavior = view.scroll_behavior_for_fixed_elements();
        let layers = view.layers.clone();
        let Some(node) = self.state_tree.state_node_mut(node_id) else {
            return;
        };
        node.layer = layers.scroll_layer;
        let Some(state) = node.frame_scrolling_state_mut() else {
            return;
        };
        state.scrolled_contents_layer = layers.root_content_layer;
        state.counter_scrolling_layer = layers.counter_scrolling_layer;
        state.inset_clip_layer = layers.inset_clip_layer;
        state.content_shadow_layer = layers.content_shadow_layer;
        state.header_layer = layers.header_layer;
        state.footer_layer = layers.footer_layer;
        state.scroll_behavior_for_fixed_elements = behavior;
    }

    fn ensure_root_state_node(&mut self, node_id: ScrollingNodeID) {
        if self.state_tree.state_node_for_id(node_id).is_some() {
            return;
        }
        if let Err(error) =
            self.attach_to_state_tree(ScrollingNodeType::FrameScrolling, node_id, None)
        {
            warn!("failed to create root state node {node_id}: {error}");
        }
    }

    /// The page's event regions were recomputed; fold them in at the next
    /// commit.
    pub fn frame_view_event_tracking_regions_changed(&mut self) {
        if self.state_tree.root_state_node().is_none() {
            return;
        }
        self.set_event_tracking_regions_dirty();
    }

    pub fn update_frame_scrolling_node(
        &mut self,
        node_id: ScrollingNodeID,
        layer: Option<GraphicsLayer>,
        scrolled_contents_layer: Option<GraphicsLayer>,
        counter_scrolling_layer: Option<GraphicsLayer>,
        inset_clip_layer: Option<GraphicsLayer>,
        geometry: Option<&ScrollingGeometry>,
    ) {
        let Some(node) = self.state_tree.state_node_mut(node_id) else {
            debug_assert!(false, "no frame scrolling node {node_id}");
            return;
        };
        node.layer = layer;
        let Some(state) = node.frame_scrolling_state_mut() else {
            return;
        };
        state.inset_clip_layer = inset_clip_layer;
        state.scrolled_contents_layer = scrolled_contents_layer;
        state.counter_scrolling_layer = counter_scrolling_layer;

        if let Some(geometry) = geometry {
            state.scrolling.scroll_origin = geometry.scroll_origin;
            state.scrolling.scroll_position = geometry.scroll_position;
            state.scrolling.total_contents_size = geometry.content_size;
            state.scrolling.reachable_contents_size = geometry.reachable_content_size;
            state.scrolling.scrollable_area_size = geometry.scrollable_area_size;
        }
    }

    pub fn update_overflow_scrolling_node(
        &mut self,
        page: &Page,
        node_id: ScrollingNodeID,
        layer: Option<GraphicsLayer>,
        scrolled_contents_layer: Option<GraphicsLayer>,
        geometry: Option<&ScrollingGeometry>,
    ) {
        let device_scale = page.device_scale_factor();
        let Some(node) = self.state_tree.state_node_mut(node_id) else {
            debug_assert!(false, "no overflow scrolling node {node_id}");
            return;
        };
        node.layer = layer;
        let Some(state) = node.overflow_scrolling_state_mut() else {
            return;
        };
        state.scrolled_contents_layer = scrolled_contents_layer;

        if let Some(geometry) = geometry {
            state.scrolling.scroll_origin = geometry.scroll_origin;
            state.scrolling.scroll_position = geometry.scroll_position;
            state.scrolling.total_contents_size = geometry.content_size;
            state.scrolling.reachable_contents_size = geometry.reachable_content_size;
            state.scrolling.scrollable_area_size = geometry.scrollable_area_size;
            set_scrolling_state_snap_offsets(
                &mut state.scrolling,
                ScrollEventAxis::Horizontal,
                &geometry.horizontal_snap_offsets,
                &geometry.horizontal_snap_offset_ranges,
                device_scale,
            );
            set_scrolling_state_snap_offsets(
                &mut state.scrolling,
                ScrollEventAxis::Vertical,
                &geometry.vertical_snap_offsets,
                &geometry.vertical_snap_offset_ranges,
                device_scale,
            );
            state.scrolling.current_horizontal_snap_point_index =
                geometry.current_horizontal_snap_point_index;
            state.scrolling.current_vertical_snap_point_index =
                geometry.current_vertical_snap_point_index;
        }
    }

    pub fn update_node_layer(&mut self, node_id: ScrollingNodeID, layer: Option<GraphicsLayer>) {
        if let Some(node) = self.state_tree.state_node_mut(node_id) {
            node.layer = layer;
        }
    }

    pub fn update_node_viewport_constraints(
        &mut self,
        node_id: ScrollingNodeID,
        constraints: ViewportConstraints,
    ) {
        let Some(node) = self.state_tree.state_node_mut(node_id) else {
            return;
        };
        match (&mut node.kind, constraints) {
            (ScrollingStateNodeKind::Fixed(slot), ViewportConstraints::Fixed(new)) => {
                *slot = new;
            }
            (ScrollingStateNodeKind::Sticky(slot), ViewportConstraints::Sticky(new)) => {
                *slot = new;
            }
            (_, constraints) => {
                warn!("viewport constraints {constraints:?} do not match node {node_id}");
            }
        }
    }

    // -- Scroll requests and reconciliation ---------------------------------

    /// Records a main-thread scroll request against the frame's state node.
    /// Programmatic requests are applied to the view and layers immediately;
    /// the request then rides the next tree commit to the scrolling thread.
    /// Returns false when the frame is not coordinated asynchronously.
    pub fn request_scroll_position_update(
        &mut self,
        page: &mut Page,
        frame_id: FrameId,
        scroll_position: LayoutPoint,
    ) -> bool {
        let Some(frame) = page.frame(frame_id) else {
            return false;
        };
        let cache_state = frame.cache_state();
        let Some(view) = frame.view() else {
            return false;
        };
        let Some(node_id) = view.scrolling_node_id() else {
            return false;
        };
        let programmatic = view.in_programmatic_scroll();

        if programmatic || cache_state != CacheState::NotInCache {
            self.update_scroll_position_after_async_scroll(
                page,
                node_id,
                scroll_position,
                None,
                programmatic,
                ScrollingLayerPositionAction::Set,
            );
        }

        // A document headed for the back/forward cache keeps the view's own
        // bookkeeping; pretend the request was handled so the caller does not
        // fall back to moving layers for a frozen view.
        if cache_state != CacheState::NotInCache {
            return true;
        }

        let Some(state) = self
            .state_tree
            .state_node_mut(node_id)
            .and_then(|node| node.scrolling_state_mut())
        else {
            return false;
        };
        state.requested_scroll_position = Some(crate::tree::RequestedScrollPosition {
            position: scroll_position,
            programmatic,
        });
        self.schedule_tree_state_commit();
        true
    }

    /// Entry point for asynchronous scroll notifications from the scrolling
    /// thread. Coalesces into the single pending update slot; a conflicting
    /// notification flushes the pending update synchronously before the new
    /// one is scheduled, so nothing is ever silently dropped.
    pub fn schedule_update_scroll_position_after_async_scroll(
        &mut self,
        page: &mut Page,
        node_id: ScrollingNodeID,
        scroll_position: LayoutPoint,
        layout_viewport_origin: Option<LayoutPoint>,
        programmatic: bool,
        action: ScrollingLayerPositionAction,
    ) {
        // Programmatic scrolls were already applied synchronously by
        // request_scroll_position_update().
        if programmatic {
            return;
        }

        let update = ScheduledScrollUpdate {
            node_id,
            scroll_position,
            layout_viewport_origin,
            programmatic,
            action,
        };

        if self.update_node_scroll_position_timer.is_active() {
            if let Some(pending) = &mut self.scheduled_scroll_update {
                if pending.matches_update_type(&update) {
                    pending.scroll_position = scroll_position;
                    pending.layout_viewport_origin = layout_viewport_origin;
                    return;
                }
            }

            // A different node or update kind reported in: flush what is
            // pending now, then start a fresh coalescing window.
            trace!(
                "conflicting scroll update for node {node_id}; flushing pending update"
            );
            self.update_node_scroll_position_timer.stop();
            if let Some(pending) = self.scheduled_scroll_update.take() {
                self.update_scroll_position_after_async_scroll(
                    page,
                    pending.node_id,
                    pending.scroll_position,
                    pending.layout_viewport_origin,
                    pending.programmatic,
                    pending.action,
                );
            }
        }

        self.scheduled_scroll_update = Some(update);
        self.update_node_scroll_position_timer
            .start_one_shot(Duration::ZERO);
    }

    /// Drives the coalescing timer and drains scrolling-thread messages.
    /// Called once per turn of the main run loop.
    pub fn service(&mut self, page: &mut Page) {
        while let Some(msg) = self.receiver.try_recv() {
            self.dispatch_scrolling_thread_msg(page, msg);
        }
        if self.update_node_scroll_position_timer.poll() {
            if let Some(update) = self.scheduled_scroll_update.take() {
                self.update_scroll_position_after_async_scroll(
                    page,
                    update.node_id,
                    update.scroll_position,
                    update.layout_viewport_origin,
                    update.programmatic,
                    update.action,
                );
            }
        }
    }

    fn dispatch_scrolling_thread_msg(&mut self, page: &mut Page, msg: ScrollingThreadMsg) {
        match msg {
            ScrollingThreadMsg::ScrollPositionChanged {
                node,
                position,
                layout_viewport_origin,
                programmatic,
                action,
            } => self.schedule_update_scroll_position_after_async_scroll(
                page,
                node,
                position,
                layout_viewport_origin,
                programmatic,
                action,
            ),
            ScrollingThreadMsg::ActiveScrollSnapIndicesChanged {
                node,
                horizontal,
                vertical,
            } => self.set_active_scroll_snap_indices(page, node, horizontal, vertical),
            ScrollingThreadMsg::ExposedUnfilledArea { timestamp, area } => {
                self.report_exposed_unfilled_area(page, timestamp, area)
            }
            ScrollingThreadMsg::SynchronousScrollingReasonsChanged { timestamp, reasons } => {
                self.report_synchronous_scrolling_reasons_changed(page, timestamp, reasons)
            }
            msg => warn!("unhandled scrolling thread message {msg:?}"),
        }
    }

    /// Finds the frame whose view owns the given node: the node itself for a
    /// frame-scrolling node, otherwise the nearest frame-scrolling ancestor.
    /// Walks the frame list rather than caching view pointers in the tree.
    pub fn frame_for_scrolling_node(
        &self,
        page: &Page,
        node_id: ScrollingNodeID,
    ) -> Option<FrameId> {
        let root = self.state_tree.root_state_node()?;
        if node_id == root.id() {
            return Some(page.main_frame().id());
        }

        let mut node = self.state_tree.state_node_for_id(node_id)?;
        while !node.is_frame_scrolling() {
            node = self.state_tree.state_node_for_id(node.parent()?)?;
        }
        let frame_node_id = node.id();

        page.frames()
            .find(|frame| {
                frame
                    .view()
                    .and_then(FrameView::scrolling_node_id)
                    == Some(frame_node_id)
            })
            .map(|frame| frame.id())
    }

    /// Applies a scroll position the scrolling thread has already adopted.
    /// Frame nodes reconcile the whole frame view; overflow nodes scroll the
    /// registered scrollable area directly.
    pub fn update_scroll_position_after_async_scroll(
        &mut self,
        page: &mut Page,
        node_id: ScrollingNodeID,
        scroll_position: LayoutPoint,
        layout_viewport_origin: Option<LayoutPoint>,
        programmatic: bool,
        action: ScrollingLayerPositionAction,
    ) {
        let Some(frame_id) = self.frame_for_scrolling_node(page, node_id) else {
            debug!("dropping scroll update for unknown node {node_id}");
            return;
        };

        debug!(
            "updating scroll position for node {node_id} to {scroll_position:?} ({action:?})"
        );

        let visual_viewport_enabled = page.visual_viewport_enabled();
        let is_frame_node = page
            .frame(frame_id)
            .and_then(|frame| frame.view())
            .and_then(FrameView::scrolling_node_id)
            == Some(node_id);

        if is_frame_node {
            if let Some(view) = page.frame_mut(frame_id).and_then(|frame| frame.view_mut()) {
                self.reconcile_scrolling_state(
                    view,
                    scroll_position,
                    LayoutViewportOriginOrOverrideRect::Origin(layout_viewport_origin),
                    programmatic,
                    ViewportRectStability::Stable,
                    action,
                    visual_viewport_enabled,
                );
            }
            self.remove_test_deferral_for_reason(
                page,
                ScrollableAreaIdentifier(node_id.0),
                DeferReason::ScrollingThreadSyncNeeded,
            );
            return;
        }

        let mut found = false;
        let mut notify_editor = false;
        if let Some(view) = page.frame_mut(frame_id).and_then(|frame| frame.view_mut()) {
            if let Some(area) = view.scrollable_area_for_scrolling_node(node_id) {
                found = true;
                area.set_is_user_scroll(action == ScrollingLayerPositionAction::Sync);
                area.scroll_to_offset_without_animation(scroll_position);
                area.set_is_user_scroll(false);
                notify_editor = action == ScrollingLayerPositionAction::Set;
            }
        }
        if !found {
            return;
        }
        if notify_editor {
            if let Some(client) = page.editor_client() {
                client.overflow_scroll_position_changed();
            }
        }
        self.remove_test_deferral_for_reason(
            page,
            ScrollableAreaIdentifier(node_id.0),
            DeferReason::ScrollingThreadSyncNeeded,
        );
    }

    /// Brings a frame view and its layers in line with a scroll position the
    /// scrolling thread has committed to.
    #[allow(clippy::too_many_arguments)]
    pub fn reconcile_scrolling_state(
        &self,
        view: &mut FrameView,
        scroll_position: LayoutPoint,
        layout_viewport: LayoutViewportOriginOrOverrideRect,
        programmatic: bool,
        stability: ViewportRectStability,
        action: ScrollingLayerPositionAction,
        visual_viewport_enabled: bool,
    ) {
        let was_programmatic = view.in_programmatic_scroll();
        view.set_in_programmatic_scroll(programmatic);

        trace!(
            "reconciling scroll position {scroll_position:?} programmatic {programmatic} \
             stability {stability:?} action {action:?}"
        );

        let mut override_viewport_rect = None;
        match layout_viewport {
            LayoutViewportOriginOrOverrideRect::Origin(origin) => {
                if let Some(origin) = origin {
                    view.set_base_layout_viewport_origin(origin, TriggerLayout::No);
                }
            }
            LayoutViewportOriginOrOverrideRect::OverrideRect(rect) => {
                if let Some(rect) = rect {
                    override_viewport_rect = Some(rect);
                    if visual_viewport_enabled
                        && stability != ViewportRectStability::ChangingObscuredInsetsInteractively
                    {
                        let trigger = if stability == ViewportRectStability::Stable {
                            TriggerLayout::Yes
                        } else {
                            TriggerLayout::No
                        };
                        view.set_layout_viewport_override_rect(Some(rect), trigger);
                    }
                }
            }
        }

        // Overscrolled positions must survive the notification; edge
        // constraining is suspended around it.
        view.set_constrains_scrolling_to_content_edge(false);
        view.notify_scroll_position_changed(scroll_position);
        view.set_constrains_scrolling_to_content_edge(true);
        view.set_in_programmatic_scroll(was_programmatic);

        if !programmatic && action != ScrollingLayerPositionAction::Set {
            if stability == ViewportRectStability::Stable {
                let rect = if visual_viewport_enabled {
                    view.layout_viewport_rect()
                } else {
                    view.rect_for_fixed_position_layout()
                };
                self.reconcile_viewport_constrained_layer_positions(&rect, action);
            } else if let Some(rect) = override_viewport_rect {
                self.reconcile_viewport_constrained_layer_positions(&rect, action);
            }
        }

        let Some(scroll_layer) = view.layers.scroll_layer.clone() else {
            return;
        };

        let position = view.scroll_position();
        let scroll_position_for_fixed = view.scroll_position_for_fixed_position();
        let top_content_inset = view.top_content_inset();

        let position_for_inset_clip = view.layers.inset_clip_layer.as_ref().map(|layer| {
            LayoutPoint::new(
                layer.position().x,
                FrameView::y_position_for_inset_clip_layer(position, top_content_inset),
            )
        });
        let position_for_contents = view.position_for_root_content_layer();
        let position_for_header = LayoutPoint::new(
            scroll_position_for_fixed.x,
            FrameView::y_position_for_header_layer(position, top_content_inset),
        );
        let position_for_footer = LayoutPoint::new(
            scroll_position_for_fixed.x,
            FrameView::y_position_for_footer_layer(
                position,
                top_content_inset,
                view.total_contents_size().height,
                view.footer_height(),
            ),
        );

        let layer_action = if programmatic || action == ScrollingLayerPositionAction::Set {
            ScrollingLayerPositionAction::Set
        } else {
            ScrollingLayerPositionAction::Sync
        };
        let apply = |layer: Option<&GraphicsLayer>, position: LayoutPoint| {
            if let Some(layer) = layer {
                layer.update_position(position, layer_action);
            }
        };

        apply(Some(&scroll_layer), LayoutPoint::new(-position.x, -position.y));
        apply(
            view.layers.counter_scrolling_layer.as_ref(),
            scroll_position_for_fixed,
        );
        if let Some(inset_clip_position) = position_for_inset_clip {
            apply(view.layers.inset_clip_layer.as_ref(), inset_clip_position);
        }
        apply(
            view.layers.content_shadow_layer.as_ref(),
            position_for_contents,
        );
        apply(
            view.layers.root_content_layer.as_ref(),
            position_for_contents,
        );
        apply(view.layers.header_layer.as_ref(), position_for_header);
        apply(view.layers.footer_layer.as_ref(), position_for_footer);
    }

    /// Re-derives every fixed and sticky layer position from the given
    /// viewport rect.
    pub fn reconcile_viewport_constrained_layer_positions(
        &self,
        viewport_rect: &LayoutRect,
        action: ScrollingLayerPositionAction,
    ) {
        trace!("reconciling viewport-constrained layers for {viewport_rect:?}");
        self.state_tree
            .reconcile_layer_positions(viewport_rect, action);
    }

    // -- Synchronous fallback -----------------------------------------------

    /// Switches a frame between asynchronous and synchronous scrolling. When
    /// falling back to synchronous, the scroll layer is force-positioned
    /// first: async updates stop flowing, and flipping the mode with a stale
    /// layer position would jump visibly.
    pub fn set_synchronous_scrolling_reasons(
        &mut self,
        page: &mut Page,
        frame_id: FrameId,
        reasons: SynchronousScrollingReasons,
    ) {
        let Some(view) = page.frame(frame_id).and_then(|frame| frame.view()) else {
            return;
        };
        let Some(node_id) = view.scrolling_node_id() else {
            return;
        };

        if !reasons.is_empty() {
            update_scroll_layer_position(view);
        }
        if let Some(state) = self
            .state_tree
            .state_node_mut(node_id)
            .and_then(|node| node.frame_scrolling_state_mut())
        {
            state.synchronous_scrolling_reasons = reasons;
        }
    }

    // -- Scroll snap --------------------------------------------------------

    /// Records where the scrolling thread's snap animation came to rest.
    pub fn set_active_scroll_snap_indices(
        &mut self,
        page: &mut Page,
        node_id: ScrollingNodeID,
        horizontal: Option<usize>,
        vertical: Option<usize>,
    ) {
        let Some(frame_id) = self.frame_for_scrolling_node(page, node_id) else {
            return;
        };
        let Some(view) = page.frame_mut(frame_id).and_then(|frame| frame.view_mut()) else {
            return;
        };

        if view.scrolling_node_id() == Some(node_id) {
            view.set_current_snap_point_indices(horizontal, vertical);
            return;
        }
        if let Some(area) = view.scrollable_area_for_scrolling_node(node_id) {
            area.set_current_snap_indices(horizontal, vertical);
        }
    }

    // -- Wheel event test deferrals -----------------------------------------

    pub fn defer_tests_for_reason(
        &self,
        page: &Page,
        identifier: ScrollableAreaIdentifier,
        reason: DeferReason,
    ) {
        if let Some(monitor) = page.wheel_event_test_monitor() {
            monitor.defer_for_reason(identifier, reason);
        }
    }

    pub fn remove_test_deferral_for_reason(
        &self,
        page: &Page,
        identifier: ScrollableAreaIdentifier,
        reason: DeferReason,
    ) {
        if let Some(monitor) = page.wheel_event_test_monitor() {
            monitor.remove_deferral_for_reason(identifier, reason);
        }
    }

    // -- Telemetry ----------------------------------------------------------

    pub fn report_exposed_unfilled_area(&self, page: &Page, timestamp: SystemTime, area: u64) {
        if let Some(logger) = page.performance_logger() {
            logger.log_scrolling_event(ScrollingEvent::ExposedTilelessArea(area), timestamp);
        }
    }

    pub fn report_synchronous_scrolling_reasons_changed(
        &self,
        page: &Page,
        timestamp: SystemTime,
        reasons: SynchronousScrollingReasons,
    ) {
        if let Some(logger) = page.performance_logger() {
            logger.log_scrolling_event(ScrollingEvent::SwitchedScrollingMode(reasons), timestamp);
        }
    }
}

impl Default for AsyncScrollingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn update_scroll_layer_position(view: &FrameView) {
    if let Some(scroll_layer) = &view.layers.scroll_layer {
        let position = view.scroll_position();
        scroll_layer.set_position(LayoutPoint::new(-position.x, -position.y));
    }
}

/// Converts one axis's snap offsets to device pixels before they enter the
/// state tree, so the scrolling thread snaps to physical pixel boundaries.
fn set_scrolling_state_snap_offsets(
    state: &mut crate::tree::ScrollingState,
    axis: ScrollEventAxis,
    offsets: &[f32],
    ranges: &[ScrollOffsetRange],
    device_scale: DeviceScale,
) {
    let offsets: Vec<f32> = offsets
        .iter()
        .map(|offset| round_to_device_pixel(*offset, device_scale, false))
        .collect();
    let ranges: Vec<ScrollOffsetRange> = ranges
        .iter()
        .map(|range| ScrollOffsetRange {
            start: round_to_device_pixel(range.start, device_scale, false),
            end: round_to_device_pixel(range.end, device_scale, false),
        })
        .collect();
    match axis {
        ScrollEventAxis::Horizontal => {
            state.horizontal_snap_offsets = offsets;
            state.horizontal_snap_offset_ranges = ranges;
        }
        ScrollEventAxis::Vertical => {
            state.vertical_snap_offsets = offsets;
            state.vertical_snap_offset_ranges = ranges;
        }
    }
}
