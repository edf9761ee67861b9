use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Identifier of a user in the identity directory
    UserId
);
id_type!(
    /// Identifier of a ritual in the catalog
    RitualId
);
id_type!(AppointmentId);
id_type!(AvailabilityId);
id_type!(AdviceId);

/// Monotonic id generator for a single collection
///
/// Ids handed out by a sequence are never handed out again, even when the record that held them
/// is removed from its collection. A sequence that reaches `u64::MAX` is exhausted and refuses
/// to hand out more ids rather than wrapping around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Start a sequence right after the highest id already in use
    pub fn starting_after<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let next = ids
            .into_iter()
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self { next }
    }

    /// Keep whichever of the two sequences is further ahead
    pub fn max(self, other: Self) -> Self {
        Self {
            next: self.next.max(other.next),
        }
    }

    pub fn next_id(&mut self) -> Result<u64, IdsExhausted> {
        let following = self.next.checked_add(1).ok_or(IdsExhausted)?;
        let id = self.next;
        self.next = following;
        Ok(id)
    }

    pub fn is_exhausted(&self) -> bool {
        self.next == u64::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no ids left in sequence")]
pub struct IdsExhausted;

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_sequence_starts_after_max() {
        let mut sequence = IdSequence::starting_after([3, 9, 4]);
        assert_that!(sequence.next_id()).is_equal_to(Ok(10));
        assert_that!(sequence.next_id()).is_equal_to(Ok(11));
    }

    #[test]
    fn test_sequence_empty() {
        let mut sequence = IdSequence::starting_after(std::iter::empty());
        assert_that!(sequence.next_id()).is_equal_to(Ok(1));
        assert_that!(IdSequence::default()).is_equal_to(IdSequence::starting_after([]));
    }

    #[test]
    fn test_sequence_max() {
        let ahead = IdSequence::starting_after([20]);
        let behind = IdSequence::starting_after([2]);
        assert_that!(behind.max(ahead)).is_equal_to(ahead);
    }

    #[test]
    fn test_sequence_exhausted() {
        let mut sequence = IdSequence::starting_after([u64::MAX]);
        assert_that!(sequence.is_exhausted()).is_true();
        assert_that!(sequence.next_id()).is_equal_to(Err(IdsExhausted));

        let mut sequence = IdSequence::starting_after([u64::MAX - 2]);
        assert_that!(sequence.next_id()).is_equal_to(Ok(u64::MAX - 1));
        assert_that!(sequence.next_id()).is_equal_to(Err(IdsExhausted));
        assert_that!(sequence.next_id()).is_equal_to(Err(IdsExhausted));
    }

    #[test]
    fn test_id_display_width() {
        assert_that!(format!("{:<4}|", AppointmentId(7))).is_equal_to("7   |".to_string());
    }
}
