//! Viewport-constraint payloads for fixed- and sticky-positioned layers.
//!
//! Layout records where each viewport-constrained layer was placed at the
//! last layout pass, together with the viewport (or constraining) rect it
//! was placed against. When the viewport later moves asynchronously, the
//! coordinator re-derives layer positions from these payloads without
//! waiting for layout to catch up.

use serde::{Deserialize, Serialize};
use swivel_traits::{LayoutPoint, LayoutRect, LayoutVector2D};

bitflags::bitflags! {
    /// Which viewport edges a constrained element is anchored to.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    pub struct AnchorEdges: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

/// Constraint payload for a fixed-positioned layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedConstraints {
    pub anchor_edges: AnchorEdges,
    pub viewport_rect_at_last_layout: LayoutRect,
    pub layer_position_at_last_layout: LayoutPoint,
}

impl FixedConstraints {
    /// Moves the last-layout layer position by the displacement of each
    /// anchored viewport edge. Left/top anchoring wins over right/bottom
    /// when both are set.
    pub fn layer_position_for_viewport_rect(&self, viewport_rect: &LayoutRect) -> LayoutPoint {
        let last = &self.viewport_rect_at_last_layout;
        let mut offset = LayoutVector2D::zero();
        if self.anchor_edges.contains(AnchorEdges::LEFT) {
            offset.x = viewport_rect.origin.x - last.origin.x;
        } else if self.anchor_edges.contains(AnchorEdges::RIGHT) {
            offset.x = viewport_rect.max_x() - last.max_x();
        }
        if self.anchor_edges.contains(AnchorEdges::TOP) {
            offset.y = viewport_rect.origin.y - last.origin.y;
        } else if self.anchor_edges.contains(AnchorEdges::BOTTOM) {
            offset.y = viewport_rect.max_y() - last.max_y();
        }
        self.layer_position_at_last_layout + offset
    }
}

/// Constraint payload for a sticky-positioned layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StickyConstraints {
    pub anchor_edges: AnchorEdges,
    pub left_offset: f32,
    pub right_offset: f32,
    pub top_offset: f32,
    pub bottom_offset: f32,
    /// Rect the sticky box is constrained against (the scrollport of the
    /// nearest scrolling ancestor), as of the last layout.
    pub constraining_rect_at_last_layout: LayoutRect,
    /// The sticky element's containing block, in the same coordinate space
    /// as the sticky box rect.
    pub containing_block_rect: LayoutRect,
    /// The sticky box in its unshifted (statically positioned) location.
    pub sticky_box_rect: LayoutRect,
    pub sticky_offset_at_last_layout: LayoutVector2D,
    pub layer_position_at_last_layout: LayoutPoint,
}

impl StickyConstraints {
    /// How far the sticky box must shift from its static position to honor
    /// its anchored edges against `constraining_rect`, clamped so the box
    /// never escapes its containing block.
    pub fn compute_sticky_offset(&self, constraining_rect: &LayoutRect) -> LayoutVector2D {
        let mut box_rect = self.sticky_box_rect;

        if self.anchor_edges.contains(AnchorEdges::RIGHT) {
            let right_limit = constraining_rect.max_x() - self.right_offset;
            let mut right_delta = (right_limit - self.sticky_box_rect.max_x()).min(0.0);
            let available_space =
                (self.containing_block_rect.origin.x - self.sticky_box_rect.origin.x).min(0.0);
            if right_delta < available_space {
                right_delta = available_space;
            }
            box_rect.origin.x += right_delta;
        }

        if self.anchor_edges.contains(AnchorEdges::LEFT) {
            let left_limit = constraining_rect.origin.x + self.left_offset;
            let mut left_delta = (left_limit - self.sticky_box_rect.origin.x).max(0.0);
            let available_space =
                (self.containing_block_rect.max_x() - self.sticky_box_rect.max_x()).max(0.0);
            if left_delta > available_space {
                left_delta = available_space;
            }
            box_rect.origin.x += left_delta;
        }

        if self.anchor_edges.contains(AnchorEdges::BOTTOM) {
            let bottom_limit = constraining_rect.max_y() - self.bottom_offset;
            let mut bottom_delta = (bottom_limit - box_rect.max_y()).min(0.0);
            let available_space =
                (self.containing_block_rect.origin.y - box_rect.origin.y).min(0.0);
            if bottom_delta < available_space {
                bottom_delta = available_space;
            }
            box_rect.origin.y += bottom_delta;
        }

        if self.anchor_edges.contains(AnchorEdges::TOP) {
            let top_limit = constraining_rect.origin.y + self.top_offset;
            let mut top_delta = (top_limit - box_rect.origin.y).max(0.0);
            let available_space =
                (self.containing_block_rect.max_y() - box_rect.max_y()).max(0.0);
            if top_delta > available_space {
                top_delta = available_space;
            }
            box_rect.origin.y += top_delta;
        }

        box_rect.origin - self.sticky_box_rect.origin
    }

    /// Layer position for the given constraining rect: the last-layout
    /// position displaced by however much the sticky offset changed.
    pub fn layer_position_for_constraining_rect(
        &self,
        constraining_rect: &LayoutRect,
    ) -> LayoutPoint {
        let sticky_offset = self.compute_sticky_offset(constraining_rect);
        self.layer_position_at_last_layout + (sticky_offset - self.sticky_offset_at_last_layout)
    }
}

/// Tagged constraint payload handed to the coordinator by the
/// compositing-update pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewportConstraints {
    Fixed(FixedConstraints),
    Sticky(StickyConstraints),
}

#[cfg(test)]
mod tests {
    use super::*;
    use swivel_traits::LayoutSize;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> LayoutRect {
        LayoutRect::new(LayoutPoint::new(x, y), LayoutSize::new(w, h))
    }

    #[test]
    fn test_fixed_layer_follows_anchored_edges() {
        let constraints = FixedConstraints {
            anchor_edges: AnchorEdges::LEFT | AnchorEdges::TOP,
            viewport_rect_at_last_layout: rect(0.0, 0.0, 800.0, 600.0),
            layer_position_at_last_layout: LayoutPoint::new(10.0, 10.0),
        };

        let moved = rect(0.0, 250.0, 800.0, 600.0);
        assert_eq!(
            constraints.layer_position_for_viewport_rect(&moved),
            LayoutPoint::new(10.0, 260.0)
        );
    }

    #[test]
    fn test_fixed_layer_right_bottom_anchoring() {
        let constraints = FixedConstraints {
            anchor_edges: AnchorEdges::RIGHT | AnchorEdges::BOTTOM,
            viewport_rect_at_last_layout: rect(0.0, 0.0, 800.0, 600.0),
            layer_position_at_last_layout: LayoutPoint::new(700.0, 500.0),
        };

        // Viewport grows 100px wider and scrolls down 50px.
        let moved = rect(0.0, 50.0, 900.0, 600.0);
        assert_eq!(
            constraints.layer_position_for_viewport_rect(&moved),
            LayoutPoint::new(800.0, 550.0)
        );
    }

    #[test]
    fn test_sticky_top_pins_at_inset_then_containing_block_edge() {
        let constraints = StickyConstraints {
            anchor_edges: AnchorEdges::TOP,
            top_offset: 10.0,
            constraining_rect_at_last_layout: rect(0.0, 0.0, 800.0, 600.0),
            containing_block_rect: rect(0.0, 100.0, 800.0, 300.0),
            sticky_box_rect: rect(0.0, 100.0, 800.0, 50.0),
            sticky_offset_at_last_layout: LayoutVector2D::zero(),
            layer_position_at_last_layout: LayoutPoint::new(0.0, 100.0),
            ..Default::default()
        };

        // Constraining rect above the box: no shift yet.
        assert_eq!(
            constraints.compute_sticky_offset(&rect(0.0, 0.0, 800.0, 600.0)),
            LayoutVector2D::zero()
        );

        // Scrolled past the box: it sticks 10px below the scrollport top.
        let offset = constraints.compute_sticky_offset(&rect(0.0, 150.0, 800.0, 600.0));
        assert_eq!(offset, LayoutVector2D::new(0.0, 60.0));

        // Far past the containing block: clamped to its bottom edge.
        let offset = constraints.compute_sticky_offset(&rect(0.0, 1000.0, 800.0, 600.0));
        assert_eq!(offset, LayoutVector2D::new(0.0, 250.0));

        // Layer position tracks the offset delta.
        assert_eq!(
            constraints.layer_position_for_constraining_rect(&rect(0.0, 150.0, 800.0, 600.0)),
            LayoutPoint::new(0.0, 160.0)
        );
    }
}
