//! Oscillator connectivity built once from a connection scheme
//!
//! A [`Topology`] answers "which oscillators influence oscillator `i`". The
//! adjacency relation is materialized at construction either as a dense
//! boolean matrix or as adjacency lists; neighbor sets are cached so the
//! engines can query them every step without rescanning a matrix row.

use crate::{
    error::{Result, TopologyError},
    scheme::{ConnectionRepresentation, ConnectionType},
};
use smallvec::SmallVec;

/// Neighbor set of a single oscillator, sorted ascending
pub type NeighborList = SmallVec<[usize; 8]>;

#[derive(Debug, Clone)]
enum Adjacency {
    /// Row-major `size * size` matrix
    Matrix(Vec<bool>),
    List(Vec<NeighborList>),
}

impl Adjacency {
    fn empty(size: usize, representation: ConnectionRepresentation) -> Self {
        match representation {
            ConnectionRepresentation::Matrix => Self::Matrix(vec![false; size * size]),
            ConnectionRepresentation::List => Self::List(vec![NeighborList::new(); size]),
        }
    }

    fn connect(&mut self, size: usize, from: usize, to: usize) {
        match self {
            Self::Matrix(cells) => cells[from * size + to] = true,
            Self::List(lists) => {
                if !lists[from].contains(&to) {
                    lists[from].push(to);
                }
            }
        }
    }

    fn contains(&self, size: usize, from: usize, to: usize) -> bool {
        match self {
            Self::Matrix(cells) => cells[from * size + to],
            Self::List(lists) => lists[from].contains(&to),
        }
    }
}

/// Connectivity of an oscillatory network
#[derive(Debug, Clone)]
pub struct Topology {
    size: usize,
    connection_type: ConnectionType,
    representation: ConnectionRepresentation,
    adjacency: Adjacency,
    /// Only populated for the matrix representation; lists answer directly
    neighbor_cache: Vec<NeighborList>,
}

impl Topology {
    /// Build the connectivity for `size` oscillators.
    ///
    /// Fails with [`TopologyError::EmptyNetwork`] for `size == 0` and with
    /// [`TopologyError::NonSquareGrid`] when a grid scheme is requested for a
    /// count that is not a perfect square.
    pub fn new(
        size: usize,
        connection_type: ConnectionType,
        representation: ConnectionRepresentation,
    ) -> Result<Self> {
        if size == 0 {
            return Err(TopologyError::EmptyNetwork);
        }

        let mut adjacency = Adjacency::empty(size, representation);

        match connection_type {
            ConnectionType::None => {}
            ConnectionType::AllToAll => {
                for from in 0..size {
                    for to in (0..size).filter(|&to| to != from) {
                        adjacency.connect(size, from, to);
                    }
                }
            }
            ConnectionType::GridFour | ConnectionType::GridEight => {
                let side = square_side(size).ok_or(TopologyError::NonSquareGrid { size })?;
                let diagonals = connection_type == ConnectionType::GridEight;
                for index in 0..size {
                    for neighbor in grid_neighbors(index, side, diagonals) {
                        adjacency.connect(size, index, neighbor);
                    }
                }
            }
            ConnectionType::ListBidirectional => {
                for index in 1..size {
                    adjacency.connect(size, index, index - 1);
                    adjacency.connect(size, index - 1, index);
                }
            }
            ConnectionType::ListUnidirectional => {
                for index in 1..size {
                    adjacency.connect(size, index - 1, index);
                }
            }
        }

        let neighbor_cache = match &mut adjacency {
            Adjacency::Matrix(cells) => cells
                .chunks(size)
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .filter_map(|(col, &linked)| linked.then_some(col))
                        .collect()
                })
                .collect(),
            Adjacency::List(lists) => {
                for list in lists.iter_mut() {
                    list.sort_unstable();
                }
                Vec::new()
            }
        };

        log::debug!(
            "Built {} topology for {} oscillators ({:?})",
            connection_type,
            size,
            representation
        );

        Ok(Self {
            size,
            connection_type,
            representation,
            adjacency,
            neighbor_cache,
        })
    }

    /// Number of oscillators
    pub fn size(&self) -> usize {
        self.size
    }

    /// Connection scheme this topology was built from
    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    /// Internal representation of the adjacency relation
    pub fn representation(&self) -> ConnectionRepresentation {
        self.representation
    }

    /// Side length of the square layout for grid schemes
    pub fn grid_side(&self) -> Option<usize> {
        if self.connection_type.is_grid() {
            square_side(self.size)
        } else {
            None
        }
    }

    /// Oscillators whose outputs influence `index`, sorted ascending
    pub fn neighbors(&self, index: usize) -> Result<&[usize]> {
        self.check_index(index)?;
        let list = match &self.adjacency {
            Adjacency::Matrix(_) => &self.neighbor_cache[index],
            Adjacency::List(lists) => &lists[index],
        };
        Ok(list.as_slice())
    }

    /// Whether `from` is wired to `to`
    pub fn has_connection(&self, from: usize, to: usize) -> Result<bool> {
        self.check_index(from)?;
        self.check_index(to)?;
        Ok(self.adjacency.contains(self.size, from, to))
    }

    /// Total number of directed connections
    pub fn connection_count(&self) -> usize {
        match &self.adjacency {
            Adjacency::Matrix(_) => self.neighbor_cache.iter().map(|n| n.len()).sum(),
            Adjacency::List(lists) => lists.iter().map(|n| n.len()).sum(),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size {
            return Err(TopologyError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        Ok(())
    }
}

fn square_side(size: usize) -> Option<usize> {
    let side = (size as f64).sqrt().round() as usize;
    (side * side == size).then_some(side)
}

fn grid_neighbors(index: usize, side: usize, diagonals: bool) -> NeighborList {
    let row = (index / side) as isize;
    let col = (index % side) as isize;
    let last = side as isize - 1;

    let mut offsets: SmallVec<[(isize, isize); 8]> =
        SmallVec::from_slice(&[(-1, 0), (1, 0), (0, -1), (0, 1)]);
    if diagonals {
        offsets.extend_from_slice(&[(-1, -1), (-1, 1), (1, -1), (1, 1)]);
    }

    offsets
        .into_iter()
        .map(|(dr, dc)| (row + dr, col + dc))
        .filter(|&(r, c)| r >= 0 && c >= 0 && r <= last && c <= last)
        .map(|(r, c)| (r as usize) * side + c as usize)
        .collect()
}
