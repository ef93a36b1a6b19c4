//! Diff between a student's previous and new track.

use crate::types::Id;

/// One membership call against the student/track link endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// Remove the student from this track.
    Unlink(Id),
    /// Add the student to this track.
    Link(Id),
}

/// Calls needed to move a student from `previous` to `next`, in issue order.
///
/// Empty when nothing changed. Otherwise the unlink (if any) always precedes
/// the link (if any).
pub fn track_changes(previous: Option<Id>, next: Option<Id>) -> Vec<LinkChange> {
    if previous == next {
        return Vec::new();
    }
    previous
        .map(LinkChange::Unlink)
        .into_iter()
        .chain(next.map(LinkChange::Link))
        .collect()
}
