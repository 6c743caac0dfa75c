//! View mount tracking
//!
//! Every navigation produces a new [`MountId`]. Async work captures the id of
//! the mount that started it, and its result is dropped if that mount is no
//! longer current.

/// Identifies one mounting of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MountId(u64);

impl MountId {
    pub fn next(self) -> Self {
        MountId(self.0.wrapping_add(1))
    }
}
