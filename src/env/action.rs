//! Action Space
//!
//! The agent picks a side every step; there is no explicit hold or exit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GymError;

/// Number of discrete actions
pub const NUM_ACTIONS: usize = 2;

/// Desired exposure for the next day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Hold (or flip into) a long lot
    Long = 0,
    /// Hold (or flip into) a short lot
    Short = 1,
}

impl Action {
    /// Convert from action index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Long),
            1 => Some(Self::Short),
            _ => None,
        }
    }

    /// Convert to action index
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Get all possible actions
    pub fn all() -> &'static [Action] {
        &[Self::Long, Self::Short]
    }

    /// Signed unit lot opened by this action
    pub fn unit_lot(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = GymError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(GymError::InvalidAction(index))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Discrete action space descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpace {
    pub n: usize,
}

impl ActionSpace {
    pub fn discrete() -> Self {
        Self { n: NUM_ACTIONS }
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_conversion() {
        for action in Action::all() {
            assert_eq!(Action::from_index(action.to_index()), Some(*action));
        }
        assert_eq!(Action::try_from(0).unwrap(), Action::Long);
        assert_eq!(Action::try_from(1).unwrap(), Action::Short);
    }

    #[test]
    fn test_invalid_index_is_rejected() {
        assert!(matches!(
            Action::try_from(2),
            Err(GymError::InvalidAction(2))
        ));
        assert!(!ActionSpace::discrete().contains(2));
    }

    #[test]
    fn test_unit_lots() {
        assert_eq!(Action::Long.unit_lot(), 1.0);
        assert_eq!(Action::Short.unit_lot(), -1.0);
        assert_eq!(Action::Long.opposite(), Action::Short);
        assert_eq!(Action::Short.to_string(), "SHORT");
    }
}
