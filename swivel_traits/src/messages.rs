//! Messages sent from the scrolling/compositor thread to the main thread.
//!
//! The coordinator itself runs entirely on the main thread; the scrolling
//! side only ever holds a [`ScrollingThreadProxy`] and reports scrolls that
//! have already happened physically. The embedder drains the paired
//! [`ScrollingThreadReceiver`] once per run-loop turn and forwards each
//! message into the coordinator, which is how the "notifications are always
//! marshaled onto the main thread" invariant is kept.

use std::time::SystemTime;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{ScrollingLayerPositionAction, ScrollingNodeID, SynchronousScrollingReasons};
use crate::units::LayoutPoint;

/// Notification from the scrolling thread that must be reconciled into the
/// main-thread model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScrollingThreadMsg {
    /// A scroll node's offset changed on the scrolling thread.
    ScrollPositionChanged {
        /// The node that was scrolled.
        node: ScrollingNodeID,
        /// The new scroll position, in the node's content coordinate space.
        position: LayoutPoint,
        /// New layout viewport origin, if the scrolling thread recomputed it.
        layout_viewport_origin: Option<LayoutPoint>,
        /// Whether this scroll originated from script or other main-thread
        /// authoritative code.
        programmatic: bool,
        /// Requested layer write priority.
        action: ScrollingLayerPositionAction,
    },
    /// The scrolling thread settled on new scroll snap indices.
    ActiveScrollSnapIndicesChanged {
        /// The node that snapped.
        node: ScrollingNodeID,
        /// Resting snap point index on the horizontal axis.
        horizontal: Option<usize>,
        /// Resting snap point index on the vertical axis.
        vertical: Option<usize>,
    },
    /// Tiles were not ready while scrolling and unfilled area was exposed.
    ExposedUnfilledArea {
        /// When the exposure was observed.
        timestamp: SystemTime,
        /// Exposed area in square device pixels.
        area: u64,
    },
    /// A frame switched between asynchronous and main-thread scrolling.
    SynchronousScrollingReasonsChanged {
        /// When the switch happened.
        timestamp: SystemTime,
        /// The reasons now forcing synchronous scrolling (empty when the
        /// frame went back to asynchronous scrolling).
        reasons: SynchronousScrollingReasons,
    },
}

/// Cloneable sending endpoint handed to the scrolling thread.
#[derive(Clone, Debug)]
pub struct ScrollingThreadProxy {
    sender: Sender<ScrollingThreadMsg>,
}

impl ScrollingThreadProxy {
    /// Sends a notification toward the main thread. Failures mean the main
    /// thread dropped its receiver during teardown and are only logged.
    pub fn send(&self, msg: ScrollingThreadMsg) {
        if let Err(e) = self.sender.send(msg) {
            warn!("Sending scrolling notification to main thread failed ({e:?}).");
        }
    }
}

/// Main-thread receiving endpoint.
#[derive(Debug)]
pub struct ScrollingThreadReceiver {
    receiver: Receiver<ScrollingThreadMsg>,
}

impl ScrollingThreadReceiver {
    /// Non-blocking receive; `None` once the queue is empty.
    pub fn try_recv(&self) -> Option<ScrollingThreadMsg> {
        self.receiver.try_recv().ok()
    }

    /// Drains every message currently queued.
    pub fn drain(&self) -> Vec<ScrollingThreadMsg> {
        let mut msgs = Vec::new();
        while let Some(msg) = self.try_recv() {
            msgs.push(msg);
        }
        msgs
    }
}

/// Creates the proxy/receiver pair connecting the scrolling thread to the
/// main-thread coordinator.
pub fn scrolling_thread_channel() -> (ScrollingThreadProxy, ScrollingThreadReceiver) {
    let (sender, receiver) = unbounded();
    (
        ScrollingThreadProxy { sender },
        ScrollingThreadReceiver { receiver },
    )
}
