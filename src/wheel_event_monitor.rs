//! Test-automation synchronization for wheel-driven scrolling.
//!
//! Automated tests that dispatch wheel events need to know when the scroll
//! has fully propagated through the scrolling thread and back. Interested
//! parties register deferrals keyed by an opaque scrollable-area identifier
//! and a reason; the monitor reports quiescence (and fires an optional
//! callback) once every deferral has been removed.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::trace;

/// Opaque identifier of one scrollable area, as seen by test tooling.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ScrollableAreaIdentifier(pub u64);

/// Why a test must keep waiting before treating scrolling as settled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeferReason {
    RubberbandInProgress,
    ScrollSnapInProgress,
    ScrollingThreadSyncNeeded,
    ContentScrollInProgress,
}

#[derive(Default)]
struct MonitorState {
    deferrals: HashMap<ScrollableAreaIdentifier, HashSet<DeferReason>>,
    on_quiescent: Option<Box<dyn Fn()>>,
}

/// Shared handle to the page's wheel-event test monitor.
#[derive(Clone, Default)]
pub struct WheelEventTestMonitor {
    state: Rc<RefCell<MonitorState>>,
}

impl WheelEventTestMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked whenever the deferral map drains to empty.
    pub fn set_notification_callback(&self, callback: impl Fn() + 'static) {
        self.state.borrow_mut().on_quiescent = Some(Box::new(callback));
    }

    pub fn defer_for_reason(&self, identifier: ScrollableAreaIdentifier, reason: DeferReason) {
        trace!("deferring {identifier:?} for reason {reason:?}");
        self.state
            .borrow_mut()
            .deferrals
            .entry(identifier)
            .or_default()
            .insert(reason);
    }

    /// Removes one deferral; a no-op when it was never registered.
    pub fn remove_deferral_for_reason(
        &self,
        identifier: ScrollableAreaIdentifier,
        reason: DeferReason,
    ) {
        let became_quiescent = {
            let mut state = self.state.borrow_mut();
            let mut removed = false;
            if let Some(reasons) = state.deferrals.get_mut(&identifier) {
                removed = reasons.remove(&reason);
                if reasons.is_empty() {
                    state.deferrals.remove(&identifier);
                }
            }
            removed && state.deferrals.is_empty()
        };
        trace!("removed deferral {reason:?} for {identifier:?}");
        if became_quiescent {
            // Borrow dropped above so the callback may re-register.
            if let Some(callback) = &self.state.borrow().on_quiescent {
                callback();
            }
        }
    }

    pub fn is_quiescent(&self) -> bool {
        self.state.borrow().deferrals.is_empty()
    }
}

impl std::fmt::Debug for WheelEventTestMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelEventTestMonitor")
            .field("deferrals", &self.state.borrow().deferrals)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_deferral_tracking() {
        let monitor = WheelEventTestMonitor::new();
        let area = ScrollableAreaIdentifier(7);
        assert!(monitor.is_quiescent());

        monitor.defer_for_reason(area, DeferReason::ScrollingThreadSyncNeeded);
        monitor.defer_for_reason(area, DeferReason::ContentScrollInProgress);
        assert!(!monitor.is_quiescent());

        monitor.remove_deferral_for_reason(area, DeferReason::ScrollingThreadSyncNeeded);
        assert!(!monitor.is_quiescent());
        monitor.remove_deferral_for_reason(area, DeferReason::ContentScrollInProgress);
        assert!(monitor.is_quiescent());
    }

    #[test]
    fn test_callback_fires_on_quiescence() {
        let monitor = WheelEventTestMonitor::new();
        let fired = Rc::new(Cell::new(0));
        let observed = fired.clone();
        monitor.set_notification_callback(move || observed.set(observed.get() + 1));

        let area = ScrollableAreaIdentifier(1);
        monitor.defer_for_reason(area, DeferReason::RubberbandInProgress);
        monitor.remove_deferral_for_reason(area, DeferReason::RubberbandInProgress);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_removing_unknown_deferral_is_harmless() {
        let monitor = WheelEventTestMonitor::new();
        monitor.remove_deferral_for_reason(
            ScrollableAreaIdentifier(99),
            DeferReason::ScrollSnapInProgress,
        );
        assert!(monitor.is_quiescent());
    }
}
