//! Per-principal concurrent session limit.

use serde::{Deserialize, Serialize};

/// How many live sessions one principal may hold at once.
///
/// Built from `session.maximum_sessions`, where `0` means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLimit {
    /// At most this many sessions.
    Fixed(u32),
    /// No per-principal limit.
    Unlimited,
}

impl SessionLimit {
    /// Whether a principal that already holds `held` sessions may be given
    /// one more without evicting anything.
    pub fn has_room_for(&self, held: usize) -> bool {
        match self {
            Self::Fixed(max) => held < *max as usize,
            Self::Unlimited => true,
        }
    }

    /// How many of `held` sessions must go before one more fits.
    pub fn overflow_after_admit(&self, held: usize) -> usize {
        match self {
            Self::Fixed(max) => (held + 1).saturating_sub(*max as usize),
            Self::Unlimited => 0,
        }
    }

    /// The numeric maximum, `None` when unlimited.
    pub fn maximum(&self) -> Option<u32> {
        match self {
            Self::Fixed(max) => Some(*max),
            Self::Unlimited => None,
        }
    }
}

impl From<u32> for SessionLimit {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Unlimited,
            max => Self::Fixed(max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_session_has_room_only_when_empty() {
        let limit = SessionLimit::from(1);
        assert!(limit.has_room_for(0));
        assert!(!limit.has_room_for(1));
        assert_eq!(limit.overflow_after_admit(0), 0);
        assert_eq!(limit.overflow_after_admit(1), 1);
    }

    #[test]
    fn test_overflow_counts_every_surplus_session() {
        let limit = SessionLimit::Fixed(2);
        assert_eq!(limit.overflow_after_admit(1), 0);
        assert_eq!(limit.overflow_after_admit(2), 1);
        // A lowered limit leaves more sessions than fit.
        assert_eq!(limit.overflow_after_admit(5), 4);
    }

    #[test]
    fn test_zero_means_unlimited() {
        let limit = SessionLimit::from(0);
        assert_eq!(limit, SessionLimit::Unlimited);
        assert!(limit.has_room_for(usize::MAX));
        assert_eq!(limit.overflow_after_admit(1_000), 0);
        assert_eq!(limit.maximum(), None);
    }
}
