//! Connectivity layer for oscillatory neural networks
//!
//! This crate builds the "who influences whom" relation of a network from a
//! connection scheme (none, all-to-all, square grids, chains) and stores it
//! either as a dense matrix or as adjacency lists.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod scheme;
pub mod topology;

pub use error::{Result, TopologyError};
pub use scheme::{ConnectionRepresentation, ConnectionType};
pub use topology::{NeighborList, Topology};
