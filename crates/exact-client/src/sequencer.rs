//! Message identifier allocation.

/// Hands out strictly increasing message identifiers starting at 1.
///
/// The counter is never reset. [`Sequencer::peek`] lets a caller stamp a
/// frame and only [`Sequencer::commit`] once the frame was written, so
/// requests that never reach the wire do not consume an identifier.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the next request will carry.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.last.wrapping_add(1)
    }

    /// Records that the identifier returned by [`Sequencer::peek`] was used.
    pub fn commit(&mut self) -> u64 {
        self.last = self.peek();
        self.last
    }

    /// Last identifier used, zero before the first request.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last
    }
}
