use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::trace;
use swivel_traits::{LayoutPoint, ScrollingLayerPositionAction};

/// Monotonic commit generation shared by every layer the compositing side
/// owns. Advanced once per tree commit; the set/sync write arbitration below
/// is scoped to one generation.
#[derive(Clone, Debug, Default)]
pub struct CommitClock {
    generation: Rc<Cell<u64>>,
}

impl CommitClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new commit generation. Prior authoritative writes no longer
    /// block best-effort synchronization.
    pub fn begin_commit(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}

#[derive(Debug)]
struct LayerState {
    position: LayoutPoint,
    /// Generation of the last authoritative write, if any.
    authoritative_generation: Option<u64>,
}

/// Cheaply cloneable, non-owning handle to a compositing layer.
///
/// The layer itself is owned by the render/compositing side; scrolling state
/// nodes and frame views hold handles only. Positions can be written at two
/// priorities:
///
/// - [`GraphicsLayer::set_position`] is an unconditional, authoritative
///   write (programmatic scrolls, explicit `Set` commits).
/// - [`GraphicsLayer::sync_position`] is a best-effort write that must not
///   undo a more authoritative write landing in the same commit generation.
///
/// Arbitration contract: within one commit generation the last authoritative
/// writer wins, and a `sync` never overrides a same-generation `set`. The
/// two write paths differ only in conflict priority, never in the value.
#[derive(Clone, Debug)]
pub struct GraphicsLayer {
    state: Rc<RefCell<LayerState>>,
    clock: CommitClock,
}

impl GraphicsLayer {
    pub fn new(clock: &CommitClock) -> Self {
        GraphicsLayer {
            state: Rc::new(RefCell::new(LayerState {
                position: LayoutPoint::zero(),
                authoritative_generation: None,
            })),
            clock: clock.clone(),
        }
    }

    pub fn position(&self) -> LayoutPoint {
        self.state.borrow().position
    }

    /// Authoritative write; always applied.
    pub fn set_position(&self, position: LayoutPoint) {
        let mut state = self.state.borrow_mut();
        state.position = position;
        state.authoritative_generation = Some(self.clock.generation());
    }

    /// Best-effort write; skipped if an authoritative write already landed
    /// in the current commit generation.
    pub fn sync_position(&self, position: LayoutPoint) {
        let mut state = self.state.borrow_mut();
        if state.authoritative_generation == Some(self.clock.generation()) {
            trace!(
                "sync_position {position:?} skipped; authoritative write already \
                 landed this generation"
            );
            return;
        }
        state.position = position;
    }

    /// Writes at the priority the action names.
    pub fn update_position(&self, position: LayoutPoint, action: ScrollingLayerPositionAction) {
        match action {
            ScrollingLayerPositionAction::Set => self.set_position(position),
            ScrollingLayerPositionAction::Sync => self.sync_position(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_yields_to_same_generation_set() {
        let clock = CommitClock::new();
        let layer = GraphicsLayer::new(&clock);

        layer.set_position(LayoutPoint::new(10.0, 20.0));
        layer.sync_position(LayoutPoint::new(0.0, 0.0));
        assert_eq!(layer.position(), LayoutPoint::new(10.0, 20.0));

        // A later authoritative write still wins.
        layer.set_position(LayoutPoint::new(5.0, 5.0));
        assert_eq!(layer.position(), LayoutPoint::new(5.0, 5.0));
    }

    #[test]
    fn test_sync_applies_after_new_generation() {
        let clock = CommitClock::new();
        let layer = GraphicsLayer::new(&clock);

        layer.set_position(LayoutPoint::new(10.0, 20.0));
        clock.begin_commit();
        layer.sync_position(LayoutPoint::new(1.0, 2.0));
        assert_eq!(layer.position(), LayoutPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_sync_applies_when_no_authoritative_write() {
        let clock = CommitClock::new();
        let layer = GraphicsLayer::new(&clock);

        layer.sync_position(LayoutPoint::new(3.0, 4.0));
        assert_eq!(layer.position(), LayoutPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_handles_share_state() {
        let clock = CommitClock::new();
        let layer = GraphicsLayer::new(&clock);
        let alias = layer.clone();

        layer.set_position(LayoutPoint::new(7.0, 8.0));
        assert_eq!(alias.position(), LayoutPoint::new(7.0, 8.0));
    }
}
