use binaural_datasets::Direction;

/// Remembers which direction the active filters were built for, so that interpolation only happens when it changes.
///
/// Comparison is exact.  Any difference at all, however small, means a new filter.
#[derive(Debug)]
pub(crate) struct ChangeDetector {
    active: Direction,
}

impl ChangeDetector {
    pub(crate) fn new(active: Direction) -> Self {
        ChangeDetector { active }
    }

    pub(crate) fn active(&self) -> Direction {
        self.active
    }

    /// Returns `requested` if the filters need rebuilding for it.
    pub(crate) fn check(&self, requested: Direction) -> Option<Direction> {
        (requested != self.active).then_some(requested)
    }

    /// Record that filters for `direction` are now active.
    ///
    /// Only called once a filter was actually built, so a failed interpolation is retried on the next block.
    pub(crate) fn commit(&mut self, direction: Direction) {
        self.active = direction;
    }
}
