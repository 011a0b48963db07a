//! The frame tree and frame views the coordinator reconciles against.
//!
//! A [`Page`] owns a main frame and any number of subframes; each frame may
//! carry a [`FrameView`], which owns the frame's scroll state, its layer
//! handles, and the registry of overflow scrollable areas living inside it.
//! The coordinator never caches pointers into this structure; it walks the
//! frame list by scrolling-node ID on every reconciliation.

use std::collections::HashMap;

use swivel_traits::{
    DeviceScale, EditorClient, EventTrackingRegions, FrameId, LayoutPoint, LayoutRect, LayoutSize,
    LayoutVector2D, ScrollBehaviorForFixedElements, ScrollOffsetRange, ScrollableArea,
    ScrollingNodeID, ScrollingPerformanceLogger,
};

use crate::layer::GraphicsLayer;
use crate::wheel_event_monitor::WheelEventTestMonitor;

/// Whether installing a new layout viewport may trigger a layout pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerLayout {
    Yes,
    No,
}

/// Where a frame's document stands relative to the back/forward cache. A
/// cached document keeps its scroll state frozen; no layer movement may
/// happen on its behalf.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CacheState {
    #[default]
    NotInCache,
    AboutToEnterCache,
    InCache,
}

/// Layer handles a frame view's scrolling touches. All optional; a frame
/// rendered without headers, insets or shadows simply leaves those unset.
#[derive(Clone, Debug, Default)]
pub struct FrameViewLayers {
    /// The layer moved by `-scroll_position` as the frame scrolls.
    pub scroll_layer: Option<GraphicsLayer>,
    /// Root content layer, offset below any header.
    pub root_content_layer: Option<GraphicsLayer>,
    /// Moves opposite the scroll so fixed backgrounds hold still.
    pub counter_scrolling_layer: Option<GraphicsLayer>,
    pub inset_clip_layer: Option<GraphicsLayer>,
    pub content_shadow_layer: Option<GraphicsLayer>,
    pub header_layer: Option<GraphicsLayer>,
    pub footer_layer: Option<GraphicsLayer>,
}

/// Main-thread scroll state for one frame.
pub struct FrameView {
    scrolling_node_id: Option<ScrollingNodeID>,
    scroll_position: LayoutPoint,
    scroll_origin: LayoutPoint,
    total_contents_size: LayoutSize,
    visible_size: LayoutSize,
    header_height: f32,
    footer_height: f32,
    top_content_inset: f32,
    frame_scale_factor: f32,
    fixed_elements_layout_relative_to_frame: bool,
    scroll_behavior_for_fixed_elements: ScrollBehaviorForFixedElements,
    base_layout_viewport_origin: LayoutPoint,
    layout_viewport_size: LayoutSize,
    layout_viewport_override: Option<LayoutRect>,
    min_stable_layout_viewport_origin: LayoutPoint,
    max_stable_layout_viewport_origin: LayoutPoint,
    in_programmatic_scroll: bool,
    constrains_scrolling_to_content_edge: bool,
    needs_layout: bool,
    pub layers: FrameViewLayers,
    scrollable_areas: HashMap<ScrollingNodeID, Box<dyn ScrollableArea>>,
    horizontal_snap_offsets: Vec<f32>,
    vertical_snap_offsets: Vec<f32>,
    horizontal_snap_offset_ranges: Vec<ScrollOffsetRange>,
    vertical_snap_offset_ranges: Vec<ScrollOffsetRange>,
    current_horizontal_snap_point_index: Option<usize>,
    current_vertical_snap_point_index: Option<usize>,
}

impl FrameView {
    pub fn new() -> Self {
        FrameView {
            scrolling_node_id: None,
            scroll_position: LayoutPoint::zero(),
            scroll_origin: LayoutPoint::zero(),
            total_contents_size: LayoutSize::zero(),
            visible_size: LayoutSize::zero(),
            header_height: 0.0,
            footer_height: 0.0,
            top_content_inset: 0.0,
            frame_scale_factor: 1.0,
            fixed_elements_layout_relative_to_frame: false,
            scroll_behavior_for_fixed_elements: ScrollBehaviorForFixedElements::default(),
            base_layout_viewport_origin: LayoutPoint::zero(),
            layout_viewport_size: LayoutSize::zero(),
            layout_viewport_override: None,
            min_stable_layout_viewport_origin: LayoutPoint::zero(),
            max_stable_layout_viewport_origin: LayoutPoint::zero(),
            in_programmatic_scroll: false,
            constrains_scrolling_to_content_edge: true,
            needs_layout: false,
            layers: FrameViewLayers::default(),
            scrollable_areas: HashMap::new(),
            horizontal_snap_offsets: Vec::new(),
            vertical_snap_offsets: Vec::new(),
            horizontal_snap_offset_ranges: Vec::new(),
            vertical_snap_offset_ranges: Vec::new(),
            current_horizontal_snap_point_index: None,
            current_vertical_snap_point_index: None,
        }
    }

    /// ID of the frame-scrolling state node backing this view, once the
    /// compositing side has assigned one.
    pub fn scrolling_node_id(&self) -> Option<ScrollingNodeID> {
        self.scrolling_node_id
    }

    pub fn set_scrolling_node_id(&mut self, id: ScrollingNodeID) {
        self.scrolling_node_id = Some(id);
    }

    pub fn scroll_position(&self) -> LayoutPoint {
        self.scroll_position
    }

    pub fn scroll_origin(&self) -> LayoutPoint {
        self.scroll_origin
    }

    pub fn set_scroll_origin(&mut self, origin: LayoutPoint) {
        self.scroll_origin = origin;
    }

    pub fn total_contents_size(&self) -> LayoutSize {
        self.total_contents_size
    }

    pub fn set_total_contents_size(&mut self, size: LayoutSize) {
        self.total_contents_size = size;
    }

    pub fn visible_size(&self) -> LayoutSize {
        self.visible_size
    }

    pub fn set_visible_size(&mut self, size: LayoutSize) {
        self.visible_size = size;
        if self.layout_viewport_size == LayoutSize::zero() {
            self.layout_viewport_size = size;
        }
    }

    /// Visible portion of the content, located at the scroll position.
    pub fn visible_content_rect(&self) -> LayoutRect {
        LayoutRect::new(self.scroll_position, self.visible_size)
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn set_header_height(&mut self, height: f32) {
        self.header_height = height;
    }

    pub fn footer_height(&self) -> f32 {
        self.footer_height
    }

    pub fn set_footer_height(&mut self, height: f32) {
        self.footer_height = height;
    }

    pub fn top_content_inset(&self) -> f32 {
        self.top_content_inset
    }

    pub fn set_top_content_inset(&mut self, inset: f32) {
        self.top_content_inset = inset;
    }

    pub fn frame_scale_factor(&self) -> f32 {
        self.frame_scale_factor
    }

    pub fn set_frame_scale_factor(&mut self, factor: f32) {
        self.frame_scale_factor = factor;
    }

    pub fn fixed_elements_layout_relative_to_frame(&self) -> bool {
        self.fixed_elements_layout_relative_to_frame
    }

    pub fn set_fixed_elements_layout_relative_to_frame(&mut self, value: bool) {
        self.fixed_elements_layout_relative_to_frame = value;
    }

    pub fn scroll_behavior_for_fixed_elements(&self) -> ScrollBehaviorForFixedElements {
        self.scroll_behavior_for_fixed_elements
    }

    pub fn set_scroll_behavior_for_fixed_elements(
        &mut self,
        behavior: ScrollBehaviorForFixedElements,
    ) {
        self.scroll_behavior_for_fixed_elements = behavior;
    }

    pub fn in_programmatic_scroll(&self) -> bool {
        self.in_programmatic_scroll
    }

    pub fn set_in_programmatic_scroll(&mut self, value: bool) {
        self.in_programmatic_scroll = value;
    }

    pub fn set_constrains_scrolling_to_content_edge(&mut self, value: bool) {
        self.constrains_scrolling_to_content_edge = value;
    }

    /// True when a viewport override installed with [`TriggerLayout::Yes`]
    /// still awaits a layout pass. Cleared by the embedder's layout.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn set_needs_layout(&mut self, value: bool) {
        self.needs_layout = value;
    }

    /// Adopts a scroll position that has already happened on the scrolling
    /// thread. Clamps to the content edge unless edge constraining is
    /// suspended (rubber-band overscroll must be representable).
    pub fn notify_scroll_position_changed(&mut self, position: LayoutPoint) {
        self.scroll_position = if self.constrains_scrolling_to_content_edge {
            self.constrain_to_content_edge(position)
        } else {
            position
        };
    }

    pub fn minimum_scroll_position(&self) -> LayoutPoint {
        LayoutPoint::zero() - self.scroll_origin.to_vector()
    }

    pub fn maximum_scroll_position(&self) -> LayoutPoint {
        let slack = (self.total_contents_size - self.visible_size).max(LayoutSize::zero());
        self.minimum_scroll_position() + LayoutVector2D::new(slack.width, slack.height)
    }

    fn constrain_to_content_edge(&self, position: LayoutPoint) -> LayoutPoint {
        let min = self.minimum_scroll_position();
        let max = self.maximum_scroll_position();
        LayoutPoint::new(
            position.x.clamp(min.x, max.x),
            position.y.clamp(min.y, max.y),
        )
    }

    pub fn layout_viewport_rect(&self) -> LayoutRect {
        self.layout_viewport_override.unwrap_or_else(|| {
            LayoutRect::new(self.base_layout_viewport_origin, self.layout_viewport_size)
        })
    }

    pub fn set_layout_viewport_size(&mut self, size: LayoutSize) {
        self.layout_viewport_size = size;
    }

    pub fn set_base_layout_viewport_origin(&mut self, origin: LayoutPoint, trigger: TriggerLayout) {
        if origin == self.base_layout_viewport_origin {
            return;
        }
        self.base_layout_viewport_origin = origin;
        if trigger == TriggerLayout::Yes {
            self.needs_layout = true;
        }
    }

    pub fn set_layout_viewport_override_rect(
        &mut self,
        rect: Option<LayoutRect>,
        trigger: TriggerLayout,
    ) {
        if rect == self.layout_viewport_override {
            return;
        }
        self.layout_viewport_override = rect;
        if trigger == TriggerLayout::Yes {
            self.needs_layout = true;
        }
    }

    pub fn min_stable_layout_viewport_origin(&self) -> LayoutPoint {
        self.min_stable_layout_viewport_origin
    }

    pub fn max_stable_layout_viewport_origin(&self) -> LayoutPoint {
        self.max_stable_layout_viewport_origin
    }

    pub fn set_stable_layout_viewport_origin_bounds(
        &mut self,
        min: LayoutPoint,
        max: LayoutPoint,
    ) {
        self.min_stable_layout_viewport_origin = min;
        self.max_stable_layout_viewport_origin = max;
    }

    /// The rect fixed-position layout is performed against.
    pub fn rect_for_fixed_position_layout(&self) -> LayoutRect {
        LayoutRect::new(self.scroll_position_for_fixed_position(), self.visible_size)
    }

    /// The scroll position as seen by fixed-position content: pinned to the
    /// document bounds during overscroll (unless fixed elements stick to the
    /// viewport), with zoom drag factors applied.
    pub fn scroll_position_for_fixed_position(&self) -> LayoutPoint {
        let visible = self.visible_content_rect();
        let total = self.total_contents_size;

        let position = match self.scroll_behavior_for_fixed_elements {
            ScrollBehaviorForFixedElements::StickToDocumentBounds => {
                constrain_scroll_position_for_overhang(
                    &visible,
                    &total,
                    self.scroll_position,
                    self.scroll_origin,
                    self.header_height,
                    self.footer_height,
                )
            }
            ScrollBehaviorForFixedElements::StickToViewportBounds => LayoutPoint::new(
                self.scroll_position.x,
                self.scroll_position.y - self.header_height,
            ),
        };

        let max_size = total - visible.size;
        let drag_factor_x = if self.fixed_elements_layout_relative_to_frame || max_size.width == 0.0
        {
            1.0
        } else {
            (total.width - visible.width() * self.frame_scale_factor) / max_size.width
        };
        let drag_factor_y = if self.fixed_elements_layout_relative_to_frame
            || max_size.height == 0.0
        {
            1.0
        } else {
            (total.height - visible.height() * self.frame_scale_factor) / max_size.height
        };

        LayoutPoint::new(
            position.x * drag_factor_x / self.frame_scale_factor,
            position.y * drag_factor_y / self.frame_scale_factor,
        )
    }

    pub fn position_for_root_content_layer(&self) -> LayoutPoint {
        LayoutPoint::new(
            0.0,
            Self::y_position_for_root_content_layer(
                self.scroll_position,
                self.top_content_inset,
                self.header_height,
            ),
        )
    }

    /// The inset clip layer sits at the bottom of the top content inset and
    /// shrinks toward zero as the content scrolls up under it. It never moves
    /// for negative (rubber-band) scroll offsets.
    pub fn y_position_for_inset_clip_layer(
        scroll_position: LayoutPoint,
        top_content_inset: f32,
    ) -> f32 {
        if top_content_inset == 0.0 {
            return 0.0;
        }
        (top_content_inset - scroll_position.y.max(0.0)).max(0.0)
    }

    /// The header scrolls with content until it reaches the top content
    /// inset, then stays put.
    pub fn y_position_for_header_layer(scroll_position: LayoutPoint, top_content_inset: f32) -> f32 {
        if top_content_inset == 0.0 {
            return 0.0;
        }
        scroll_position.y.max(0.0).min(top_content_inset)
    }

    pub fn y_position_for_footer_layer(
        scroll_position: LayoutPoint,
        top_content_inset: f32,
        total_contents_height: f32,
        footer_height: f32,
    ) -> f32 {
        Self::y_position_for_header_layer(scroll_position, top_content_inset)
            + total_contents_height
            - footer_height
    }

    pub fn y_position_for_root_content_layer(
        scroll_position: LayoutPoint,
        top_content_inset: f32,
        header_height: f32,
    ) -> f32 {
        Self::y_position_for_header_layer(scroll_position, top_content_inset) + header_height
    }

    /// Registers an overflow scrollable area under its scrolling node ID.
    pub fn add_scrollable_area(&mut self, id: ScrollingNodeID, area: Box<dyn ScrollableArea>) {
        self.scrollable_areas.insert(id, area);
    }

    pub fn remove_scrollable_area(&mut self, id: ScrollingNodeID) {
        self.scrollable_areas.remove(&id);
    }

    pub fn scrollable_area_for_scrolling_node(
        &mut self,
        id: ScrollingNodeID,
    ) -> Option<&mut dyn ScrollableArea> {
        match self.scrollable_areas.get_mut(&id) {
            Some(area) => Some(area.as_mut()),
            None => None,
        }
    }

    pub fn set_snap_offsets(
        &mut self,
        horizontal: Vec<f32>,
        vertical: Vec<f32>,
        horizontal_ranges: Vec<ScrollOffsetRange>,
        vertical_ranges: Vec<ScrollOffsetRange>,
    ) {
        self.horizontal_snap_offsets = horizontal;
        self.vertical_snap_offsets = vertical;
        self.horizontal_snap_offset_ranges = horizontal_ranges;
        self.vertical_snap_offset_ranges = vertical_ranges;
    }

    pub fn horizontal_snap_offsets(&self) -> &[f32] {
        &self.horizontal_snap_offsets
    }

    pub fn vertical_snap_offsets(&self) -> &[f32] {
        &self.vertical_snap_offsets
    }

    pub fn horizontal_snap_offset_ranges(&self) -> &[ScrollOffsetRange] {
        &self.horizontal_snap_offset_ranges
    }

    pub fn vertical_snap_offset_ranges(&self) -> &[ScrollOffsetRange] {
        &self.vertical_snap_offset_ranges
    }

    pub fn current_horizontal_snap_point_index(&self) -> Option<usize> {
        self.current_horizontal_snap_point_index
    }

    pub fn current_vertical_snap_point_index(&self) -> Option<usize> {
        self.current_vertical_snap_point_index
    }

    pub fn set_current_snap_point_indices(
        &mut self,
        horizontal: Option<usize>,
        vertical: Option<usize>,
    ) {
        self.current_horizontal_snap_point_index = horizontal;
        self.current_vertical_snap_point_index = vertical;
    }
}

impl Default for FrameView {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameView")
            .field("scrolling_node_id", &self.scrolling_node_id)
            .field("scroll_position", &self.scroll_position)
            .field("scroll_origin", &self.scroll_origin)
            .field("total_contents_size", &self.total_contents_size)
            .field("visible_size", &self.visible_size)
            .field("in_programmatic_scroll", &self.in_programmatic_scroll)
            .field("layers", &self.layers)
            .field("scrollable_areas", &self.scrollable_areas.keys())
            .finish_non_exhaustive()
    }
}

/// Keeps the scroll rect the document can actually satisfy: clipped to the
/// document, pushed down from overscroll at the top left, then up from
/// overscroll at the bottom right.
pub fn constrain_scroll_position_for_overhang(
    visible_content_rect: &LayoutRect,
    total_contents_size: &LayoutSize,
    scroll_position: LayoutPoint,
    scroll_origin: LayoutPoint,
    header_height: f32,
    footer_height: f32,
) -> LayoutPoint {
    let ideal_size = LayoutSize::new(
        visible_content_rect.width().min(total_contents_size.width),
        visible_content_rect.height().min(total_contents_size.height),
    );

    let mut scroll_rect = LayoutRect::new(
        scroll_position + scroll_origin.to_vector() - LayoutVector2D::new(0.0, header_height),
        ideal_size,
    );
    let document_rect = LayoutRect::new(
        LayoutPoint::zero(),
        LayoutSize::new(
            total_contents_size.width,
            total_contents_size.height - header_height - footer_height,
        ),
    );

    let clipped = scroll_rect
        .intersection(&document_rect)
        .unwrap_or(LayoutRect::zero());
    if clipped.size != ideal_size {
        // Restore the size, pushing the rect down from the top left; if it
        // still clips, push it back up from the bottom right.
        scroll_rect = LayoutRect::new(clipped.origin, ideal_size);
        let reclipped = scroll_rect
            .intersection(&document_rect)
            .unwrap_or(LayoutRect::zero());
        let mut origin = reclipped.origin;
        if reclipped.width() < ideal_size.width {
            origin.x -= ideal_size.width - reclipped.width();
        }
        if reclipped.height() < ideal_size.height {
            origin.y -= ideal_size.height - reclipped.height();
        }
        scroll_rect = LayoutRect::new(origin, ideal_size);
    } else {
        scroll_rect = clipped;
    }

    scroll_rect.origin - scroll_origin.to_vector()
}

/// One frame of the page's frame tree.
#[derive(Debug)]
pub struct Frame {
    id: FrameId,
    cache_state: CacheState,
    view: Option<FrameView>,
}

impl Frame {
    pub fn new(id: FrameId) -> Self {
        Frame {
            id,
            cache_state: CacheState::NotInCache,
            view: None,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache_state
    }

    pub fn set_cache_state(&mut self, state: CacheState) {
        self.cache_state = state;
    }

    pub fn view(&self) -> Option<&FrameView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut FrameView> {
        self.view.as_mut()
    }

    pub fn set_view(&mut self, view: FrameView) {
        self.view = Some(view);
    }
}

/// The page the coordinator serves: its frames plus the page-scoped clients
/// reconciliation reports into.
pub struct Page {
    frames: Vec<Frame>,
    visual_viewport_enabled: bool,
    device_scale_factor: DeviceScale,
    wheel_event_test_monitor: Option<WheelEventTestMonitor>,
    editor_client: Option<Box<dyn EditorClient>>,
    performance_logger: Option<Box<dyn ScrollingPerformanceLogger>>,
    event_tracking_regions: EventTrackingRegions,
}

impl Page {
    pub fn new(main_frame_id: FrameId) -> Self {
        Page {
            frames: vec![Frame::new(main_frame_id)],
            visual_viewport_enabled: false,
            device_scale_factor: DeviceScale::new(1.0),
            wheel_event_test_monitor: None,
            editor_client: None,
            performance_logger: None,
            event_tracking_regions: EventTrackingRegions::default(),
        }
    }

    pub fn main_frame(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn main_frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Adds a subframe. Insertion order is the order frame walks observe.
    pub fn create_subframe(&mut self, id: FrameId) -> &mut Frame {
        debug_assert!(self.frames.iter().all(|frame| frame.id() != id));
        self.frames.push(Frame::new(id));
        let index = self.frames.len() - 1;
        &mut self.frames[index]
    }

    pub fn remove_subframe(&mut self, id: FrameId) {
        debug_assert!(self.frames[0].id() != id);
        self.frames.retain(|frame| frame.id() != id);
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.id() == id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|frame| frame.id() == id)
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.frames.iter_mut()
    }

    pub fn visual_viewport_enabled(&self) -> bool {
        self.visual_viewport_enabled
    }

    pub fn set_visual_viewport_enabled(&mut self, enabled: bool) {
        self.visual_viewport_enabled = enabled;
    }

    pub fn device_scale_factor(&self) -> DeviceScale {
        self.device_scale_factor
    }

    pub fn set_device_scale_factor(&mut self, scale: DeviceScale) {
        self.device_scale_factor = scale;
    }

    /// Present only while test automation is watching wheel-driven scrolls.
    pub fn wheel_event_test_monitor(&self) -> Option<&WheelEventTestMonitor> {
        self.wheel_event_test_monitor.as_ref()
    }

    pub fn set_wheel_event_test_monitor(&mut self, monitor: Option<WheelEventTestMonitor>) {
        self.wheel_event_test_monitor = monitor;
    }

    pub fn expects_wheel_event_test_trigger(&self) -> bool {
        self.wheel_event_test_monitor.is_some()
    }

    pub fn editor_client(&self) -> Option<&dyn EditorClient> {
        self.editor_client.as_deref()
    }

    pub fn set_editor_client(&mut self, client: Box<dyn EditorClient>) {
        self.editor_client = Some(client);
    }

    pub fn performance_logger(&self) -> Option<&dyn ScrollingPerformanceLogger> {
        self.performance_logger.as_deref()
    }

    pub fn set_performance_logger(&mut self, logger: Box<dyn ScrollingPerformanceLogger>) {
        self.performance_logger = Some(logger);
    }

    pub fn event_tracking_regions(&self) -> &EventTrackingRegions {
        &self.event_tracking_regions
    }

    pub fn set_event_tracking_regions(&mut self, regions: EventTrackingRegions) {
        self.event_tracking_regions = regions;
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("frames", &self.frames)
            .field("visual_viewport_enabled", &self.visual_viewport_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with_content() -> FrameView {
        let mut view = FrameView::new();
        view.set_visible_size(LayoutSize::new(800.0, 600.0));
        view.set_total_contents_size(LayoutSize::new(800.0, 2000.0));
        view
    }

    #[test]
    fn test_inset_clip_and_header_positions() {
        let at = |y: f32| LayoutPoint::new(0.0, y);

        // No inset: both helpers are pinned at zero.
        assert_eq!(FrameView::y_position_for_inset_clip_layer(at(100.0), 0.0), 0.0);
        assert_eq!(FrameView::y_position_for_header_layer(at(100.0), 0.0), 0.0);

        // The clip layer shrinks its offset as content scrolls under the
        // inset; the header follows the scroll until the inset is consumed.
        assert_eq!(FrameView::y_position_for_inset_clip_layer(at(0.0), 40.0), 40.0);
        assert_eq!(FrameView::y_position_for_inset_clip_layer(at(25.0), 40.0), 15.0);
        assert_eq!(FrameView::y_position_for_inset_clip_layer(at(80.0), 40.0), 0.0);
        assert_eq!(FrameView::y_position_for_header_layer(at(25.0), 40.0), 25.0);
        assert_eq!(FrameView::y_position_for_header_layer(at(80.0), 40.0), 40.0);

        // Rubber-band overscroll above the top does not move either layer.
        assert_eq!(FrameView::y_position_for_inset_clip_layer(at(-30.0), 40.0), 40.0);
        assert_eq!(FrameView::y_position_for_header_layer(at(-30.0), 40.0), 0.0);
    }

    #[test]
    fn test_footer_and_root_content_positions() {
        let at = |y: f32| LayoutPoint::new(0.0, y);
        assert_eq!(
            FrameView::y_position_for_footer_layer(at(10.0), 40.0, 2000.0, 60.0),
            10.0 + 2000.0 - 60.0
        );
        assert_eq!(
            FrameView::y_position_for_root_content_layer(at(10.0), 40.0, 50.0),
            60.0
        );
    }

    #[test]
    fn test_fixed_position_pins_to_document_bounds() {
        let mut view = view_with_content();

        // Overscrolled past the top: fixed content stays at the document edge.
        view.set_constrains_scrolling_to_content_edge(false);
        view.notify_scroll_position_changed(LayoutPoint::new(0.0, -120.0));
        assert_eq!(
            view.scroll_position_for_fixed_position(),
            LayoutPoint::zero()
        );

        // Overscrolled past the bottom: pinned to the maximum scroll position.
        view.notify_scroll_position_changed(LayoutPoint::new(0.0, 1600.0));
        assert_eq!(
            view.scroll_position_for_fixed_position(),
            LayoutPoint::new(0.0, 1400.0)
        );

        // In range: passes through untouched.
        view.notify_scroll_position_changed(LayoutPoint::new(0.0, 500.0));
        assert_eq!(
            view.scroll_position_for_fixed_position(),
            LayoutPoint::new(0.0, 500.0)
        );
    }

    #[test]
    fn test_fixed_position_follows_viewport_when_configured() {
        let mut view = view_with_content();
        view.set_scroll_behavior_for_fixed_elements(
            ScrollBehaviorForFixedElements::StickToViewportBounds,
        );
        view.set_constrains_scrolling_to_content_edge(false);
        view.notify_scroll_position_changed(LayoutPoint::new(0.0, -120.0));
        assert_eq!(
            view.scroll_position_for_fixed_position(),
            LayoutPoint::new(0.0, -120.0)
        );
    }

    #[test]
    fn test_scroll_position_clamped_at_content_edge() {
        let mut view = view_with_content();
        view.notify_scroll_position_changed(LayoutPoint::new(50.0, 5000.0));
        assert_eq!(view.scroll_position(), LayoutPoint::new(0.0, 1400.0));

        view.notify_scroll_position_changed(LayoutPoint::new(-10.0, -10.0));
        assert_eq!(view.scroll_position(), LayoutPoint::zero());
    }

    #[test]
    fn test_layout_viewport_override_takes_precedence() {
        let mut view = view_with_content();
        view.set_base_layout_viewport_origin(LayoutPoint::new(0.0, 100.0), TriggerLayout::No);
        assert_eq!(view.layout_viewport_rect().origin, LayoutPoint::new(0.0, 100.0));
        assert!(!view.needs_layout());

        let override_rect = LayoutRect::new(
            LayoutPoint::new(0.0, 250.0),
            LayoutSize::new(800.0, 600.0),
        );
        view.set_layout_viewport_override_rect(Some(override_rect), TriggerLayout::Yes);
        assert_eq!(view.layout_viewport_rect(), override_rect);
        assert!(view.needs_layout());

        view.set_needs_layout(false);
        view.set_layout_viewport_override_rect(None, TriggerLayout::No);
        assert_eq!(view.layout_viewport_rect().origin, LayoutPoint::new(0.0, 100.0));
        assert!(!view.needs_layout());
    }

    #[test]
    fn test_page_frame_lookup() {
        let mut page = Page::new(FrameId(1));
        page.create_subframe(FrameId(2));

        assert_eq!(page.main_frame().id(), FrameId(1));
        assert!(page.frame(FrameId(2)).is_some());
        assert!(page.frame(FrameId(3)).is_none());

        page.remove_subframe(FrameId(2));
        assert!(page.frame(FrameId(2)).is_none());
        assert_eq!(page.frames().count(), 1);
    }
}
