//! Mutation counters.

/// Counts every write issued against a [`Document`](crate::Document).
///
/// Writes are counted even when they store the value already present:
/// avoiding redundant writes is the caller's job, and these counters are how
/// that is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Nodes created
    pub created: u64,
    /// Nodes inserted or appended under a parent
    pub inserted: u64,
    /// Nodes replaced in place
    pub replaced: u64,
    /// Nodes detached from their parent
    pub removed: u64,
    /// Text node content writes
    pub text_writes: u64,
    /// Attribute sets and removals
    pub attribute_writes: u64,
    /// Property sets
    pub property_writes: u64,
    /// Style declaration writes (including whole `cssText` writes)
    pub style_writes: u64,
    /// Listener sets and clears
    pub listener_writes: u64,
}

impl MutationStats {
    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.created
            + self.inserted
            + self.replaced
            + self.removed
            + self.text_writes
            + self.attribute_writes
            + self.property_writes
            + self.style_writes
            + self.listener_writes
    }

    /// Structural changes only: creations, insertions, replacements, removals.
    pub fn structural(&self) -> u64 {
        self.created + self.inserted + self.replaced + self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total() {
        let stats = MutationStats {
            created: 2,
            inserted: 2,
            attribute_writes: 1,
            ..Default::default()
        };
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.structural(), 4);
    }
}
