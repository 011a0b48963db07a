use swivel_traits::ScrollingNodeID;

/// Convenient type alias of Result type for swivel.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by swivel.
///
/// Almost every failure mode in this subsystem is a benign "target no longer
/// exists" case that is logged and skipped rather than surfaced; the variants
/// here are the few precondition violations a caller can act on.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Attempted to attach a scrolling node under a parent the state tree
    /// does not contain.
    #[error("no scrolling state node with id {0} to attach under")]
    ParentNodeMissing(ScrollingNodeID),
}
