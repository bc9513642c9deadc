//! Connection schemes and their internal representations

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structure of connections between oscillators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionType {
    /// No connections at all
    None,
    /// Every oscillator is connected with every other one
    #[default]
    AllToAll,
    /// Square grid, each oscillator linked to its up/down/left/right neighbors
    GridFour,
    /// Square grid, four-neighborhood plus the diagonals
    GridEight,
    /// Chain where each oscillator is linked with its predecessor and successor
    ListBidirectional,
    /// Chain where each oscillator is linked only to its successor
    ListUnidirectional,
}

impl ConnectionType {
    /// Whether the scheme lays oscillators out on a square grid
    pub fn is_grid(&self) -> bool {
        matches!(self, Self::GridFour | Self::GridEight)
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::AllToAll => "all-to-all",
            Self::GridFour => "grid-4",
            Self::GridEight => "grid-8",
            Self::ListBidirectional => "list-bidir",
            Self::ListUnidirectional => "list-unidir",
        };
        f.write_str(name)
    }
}

/// Internal storage of the adjacency relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionRepresentation {
    /// Dense N x N boolean matrix
    #[default]
    Matrix,
    /// Per-oscillator adjacency lists
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_detection() {
        assert!(ConnectionType::GridFour.is_grid());
        assert!(ConnectionType::GridEight.is_grid());
        assert!(!ConnectionType::AllToAll.is_grid());
        assert!(!ConnectionType::ListUnidirectional.is_grid());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ConnectionType::default(), ConnectionType::AllToAll);
        assert_eq!(ConnectionRepresentation::default(), ConnectionRepresentation::Matrix);
        assert_eq!(ConnectionType::GridEight.to_string(), "grid-8");
    }
}
