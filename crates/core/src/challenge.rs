//! Challenge payload generators
//!
//! Each generator expands a seeded [`Mt64`] into a canonical sequence of
//! numbers and streams their decimal text, with no delimiter, into a
//! [`Checksum`]. Payloads are never materialized as one string.
//!
//! ## Shortest path
//!
//! ```text
//! grid:     grid_size x grid_size, outer border is Frontier
//! entry:    (next % size, next % size) redrawn until the cell is Blank
//! exit:     same, redrawn until Blank
//! blockers: nb_blockers draws of (row, col); Blank cells become Frontier,
//!           other draws are dropped
//! path:     BFS, 4 neighbours in order up/down/left/right, unit cost
//! payload:  row col row col ... from entry to exit inclusive
//! ```
//!
//! A grid whose exit cannot be reached has no payload; the nonce is skipped.

use core::fmt::{self, Write as _};
use core::str::FromStr;
use std::collections::VecDeque;

use crate::error::{SolverError, SolverResult};
use crate::mt64::Mt64;
use crate::oracle::Checksum;
use crate::params::*;

/// Challenge kinds understood by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    SortedList,
    ReverseSortedList,
    ShortestPath,
}

impl ChallengeKind {
    /// Protocol name of the challenge
    pub fn name(&self) -> &'static str {
        match self {
            ChallengeKind::SortedList => "sorted_list",
            ChallengeKind::ReverseSortedList => "reverse_sorted_list",
            ChallengeKind::ShortestPath => "shortest_path",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChallengeKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sorted_list" => Ok(ChallengeKind::SortedList),
            "reverse_sorted_list" => Ok(ChallengeKind::ReverseSortedList),
            "shortest_path" => Ok(ChallengeKind::ShortestPath),
            other => Err(SolverError::UnknownChallengeKind(other.to_string())),
        }
    }
}

/// Numeric challenge type, as used across the C ABI
impl TryFrom<u32> for ChallengeKind {
    type Error = SolverError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChallengeKind::SortedList),
            1 => Ok(ChallengeKind::ReverseSortedList),
            2 => Ok(ChallengeKind::ShortestPath),
            other => Err(SolverError::UnknownChallengeKind(other.to_string())),
        }
    }
}

/// Parameters of a challenge, shared read-only by all workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeParameters {
    SortedList { nb_elements: usize },
    ReverseSortedList { nb_elements: usize },
    ShortestPath { grid_size: usize, nb_blockers: usize },
}

impl ChallengeParameters {
    /// Validated sorted list parameters
    pub fn sorted_list(nb_elements: usize) -> SolverResult<Self> {
        let params = ChallengeParameters::SortedList { nb_elements };
        params.validate()?;
        Ok(params)
    }

    /// Validated reverse sorted list parameters
    pub fn reverse_sorted_list(nb_elements: usize) -> SolverResult<Self> {
        let params = ChallengeParameters::ReverseSortedList { nb_elements };
        params.validate()?;
        Ok(params)
    }

    /// Validated shortest path parameters
    pub fn shortest_path(grid_size: usize, nb_blockers: usize) -> SolverResult<Self> {
        let params = ChallengeParameters::ShortestPath {
            grid_size,
            nb_blockers,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeParameters::SortedList { .. } => ChallengeKind::SortedList,
            ChallengeParameters::ReverseSortedList { .. } => ChallengeKind::ReverseSortedList,
            ChallengeParameters::ShortestPath { .. } => ChallengeKind::ShortestPath,
        }
    }

    /// Check the parameters against the buffer limits
    pub fn validate(&self) -> SolverResult<()> {
        match *self {
            ChallengeParameters::SortedList { nb_elements }
            | ChallengeParameters::ReverseSortedList { nb_elements } => {
                if nb_elements == 0 || nb_elements > MAX_LIST_ELEMENTS {
                    return Err(SolverError::InvalidParameters(format!(
                        "nb_elements must be in 1..={MAX_LIST_ELEMENTS}, got {nb_elements}"
                    )));
                }
            }
            ChallengeParameters::ShortestPath {
                grid_size,
                nb_blockers,
            } => {
                if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
                    return Err(SolverError::InvalidParameters(format!(
                        "grid_size must be in {MIN_GRID_SIZE}..={MAX_GRID_SIZE}, got {grid_size}"
                    )));
                }
                if nb_blockers > grid_size * grid_size {
                    return Err(SolverError::InvalidParameters(format!(
                        "nb_blockers must not exceed {} cells, got {nb_blockers}",
                        grid_size * grid_size
                    )));
                }
            }
        }
        Ok(())
    }

    /// Stream the payload of this challenge into `checksum`
    ///
    /// Returns `false` when the seed yields no payload (unreachable exit).
    #[inline]
    pub fn feed<C: Checksum>(
        &self,
        mt: &mut Mt64,
        checksum: &mut C,
        workspace: &mut Workspace,
    ) -> bool {
        match *self {
            ChallengeParameters::SortedList { nb_elements } => {
                feed_sorted_list(mt, checksum, nb_elements, workspace);
                true
            }
            ChallengeParameters::ReverseSortedList { nb_elements } => {
                feed_reverse_sorted_list(mt, checksum, nb_elements, workspace);
                true
            }
            ChallengeParameters::ShortestPath {
                grid_size,
                nb_blockers,
            } => feed_grid_path(mt, checksum, grid_size, nb_blockers, workspace),
        }
    }
}

/// Per-worker scratch buffers, allocated once per search
#[derive(Default)]
pub struct Workspace {
    numbers: Vec<u64>,
    text: String,
    grid: Grid,
    queue: VecDeque<usize>,
    previous: Vec<usize>,
    path: Vec<Cell>,
}

impl Workspace {
    /// Buffers sized for `params`
    pub fn new(params: &ChallengeParameters) -> Self {
        let mut workspace = Self {
            text: String::with_capacity(20),
            ..Self::default()
        };
        match *params {
            ChallengeParameters::SortedList { nb_elements }
            | ChallengeParameters::ReverseSortedList { nb_elements } => {
                workspace.numbers.reserve_exact(nb_elements);
            }
            ChallengeParameters::ShortestPath { grid_size, .. } => {
                let cells = grid_size * grid_size;
                workspace.grid = Grid::blank(grid_size);
                workspace.queue.reserve(cells);
                workspace.previous.reserve_exact(cells);
                workspace.path.reserve(cells);
            }
        }
        workspace
    }

    /// Numbers drawn by the last list challenge, in payload order
    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    /// Grid built by the last shortest path challenge
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Path found by the last shortest path challenge
    pub fn path(&self) -> &[Cell] {
        &self.path
    }
}

/// Feed the decimal text of `value`
#[inline(always)]
fn feed_decimal<C: Checksum>(checksum: &mut C, text: &mut String, value: u64) {
    text.clear();
    // Writing into a String cannot fail
    let _ = write!(text, "{value}");
    checksum.update(text.as_bytes());
}

fn draw_numbers(mt: &mut Mt64, nb_elements: usize, numbers: &mut Vec<u64>) {
    numbers.clear();
    numbers.extend((0..nb_elements).map(|_| mt.next_u64()));
}

/// Draw `nb_elements` values, sort ascending, feed them
pub fn feed_sorted_list<C: Checksum>(
    mt: &mut Mt64,
    checksum: &mut C,
    nb_elements: usize,
    workspace: &mut Workspace,
) {
    draw_numbers(mt, nb_elements, &mut workspace.numbers);
    workspace.numbers.sort();

    for &value in &workspace.numbers {
        feed_decimal(checksum, &mut workspace.text, value);
    }
}

/// Draw `nb_elements` values, sort descending, feed them
pub fn feed_reverse_sorted_list<C: Checksum>(
    mt: &mut Mt64,
    checksum: &mut C,
    nb_elements: usize,
    workspace: &mut Workspace,
) {
    draw_numbers(mt, nb_elements, &mut workspace.numbers);
    workspace.numbers.sort_by(|a, b| b.cmp(a));

    for &value in &workspace.numbers {
        feed_decimal(checksum, &mut workspace.text, value);
    }
}

/// Build the grid, solve it and feed the path coordinates
///
/// Returns `Ok(false)` if the exit is unreachable; nothing is fed in that
/// case. Grid dimensions outside the supported bounds are rejected.
pub fn feed_shortest_path<C: Checksum>(
    mt: &mut Mt64,
    checksum: &mut C,
    grid_size: usize,
    nb_blockers: usize,
    workspace: &mut Workspace,
) -> SolverResult<bool> {
    ChallengeParameters::shortest_path(grid_size, nb_blockers)?;
    Ok(feed_grid_path(mt, checksum, grid_size, nb_blockers, workspace))
}

fn feed_grid_path<C: Checksum>(
    mt: &mut Mt64,
    checksum: &mut C,
    grid_size: usize,
    nb_blockers: usize,
    workspace: &mut Workspace,
) -> bool {
    // Smaller grids cannot place distinct entry and exit cells
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
        return false;
    }

    let Workspace {
        text,
        grid,
        queue,
        previous,
        path,
        ..
    } = workspace;

    grid.fill(mt, grid_size, nb_blockers);
    if !grid.solve_into(queue, previous, path) {
        return false;
    }

    for cell in path.iter() {
        feed_decimal(checksum, text, cell.row as u64);
        feed_decimal(checksum, text, cell.col as u64);
    }
    true
}

/// Grid tile kinds
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tile {
    #[default]
    Blank = 0,
    Entry = 1,
    Exit = 2,
    Frontier = 3,
}

/// Grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Square shortest path grid
#[derive(Debug, Clone, Default)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
    entry: Cell,
    exit: Cell,
}

/// Sentinel for cells not reached by the search
const UNVISITED: usize = usize::MAX;

impl Grid {
    /// Empty `size x size` grid, border included
    fn blank(size: usize) -> Self {
        let mut grid = Self {
            size,
            tiles: Vec::with_capacity(size * size),
            ..Self::default()
        };
        grid.reset(size);
        grid
    }

    /// Generate the grid for a seeded generator
    pub fn generate(mt: &mut Mt64, size: usize, nb_blockers: usize) -> SolverResult<Self> {
        ChallengeParameters::shortest_path(size, nb_blockers)?;
        let mut grid = Self::default();
        grid.fill(mt, size, nb_blockers);
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn entry(&self) -> Cell {
        self.entry
    }

    pub fn exit(&self) -> Cell {
        self.exit
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        self.tiles[self.index(cell)]
    }

    #[inline(always)]
    fn index(&self, cell: Cell) -> usize {
        cell.row * self.size + cell.col
    }

    #[inline(always)]
    fn cell(&self, index: usize) -> Cell {
        Cell {
            row: index / self.size,
            col: index % self.size,
        }
    }

    /// Clear to a walled, blank grid
    fn reset(&mut self, size: usize) {
        self.size = size;
        self.tiles.clear();
        self.tiles.resize(size * size, Tile::Blank);

        for i in 0..size {
            self.tiles[i] = Tile::Frontier;
            self.tiles[(size - 1) * size + i] = Tile::Frontier;
            self.tiles[i * size] = Tile::Frontier;
            self.tiles[i * size + size - 1] = Tile::Frontier;
        }
    }

    #[inline(always)]
    fn draw_cell(&self, mt: &mut Mt64) -> Cell {
        let size = self.size as u64;
        let row = (mt.next_u64() % size) as usize;
        let col = (mt.next_u64() % size) as usize;
        Cell { row, col }
    }

    /// Draw until a blank cell comes up and mark it
    fn place(&mut self, mt: &mut Mt64, tile: Tile) -> Cell {
        loop {
            let cell = self.draw_cell(mt);
            let index = self.index(cell);
            if self.tiles[index] == Tile::Blank {
                self.tiles[index] = tile;
                return cell;
            }
        }
    }

    /// Regenerate in place from the generator
    fn fill(&mut self, mt: &mut Mt64, size: usize, nb_blockers: usize) {
        self.reset(size);
        self.entry = self.place(mt, Tile::Entry);
        self.exit = self.place(mt, Tile::Exit);

        for _ in 0..nb_blockers {
            let cell = self.draw_cell(mt);
            let index = self.index(cell);
            if self.tiles[index] == Tile::Blank {
                self.tiles[index] = Tile::Frontier;
            }
        }
    }

    /// Shortest path from entry to exit, both included
    pub fn shortest_path(&self) -> Option<Vec<Cell>> {
        let mut queue = VecDeque::new();
        let mut previous = Vec::new();
        let mut path = Vec::new();
        self.solve_into(&mut queue, &mut previous, &mut path)
            .then_some(path)
    }

    /// Breadth-first search reusing caller buffers
    fn solve_into(
        &self,
        queue: &mut VecDeque<usize>,
        previous: &mut Vec<usize>,
        path: &mut Vec<Cell>,
    ) -> bool {
        let size = self.size;
        let start = self.index(self.entry);
        let goal = self.index(self.exit);

        queue.clear();
        path.clear();
        previous.clear();
        previous.resize(size * size, UNVISITED);

        previous[start] = start;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                break;
            }
            // Reached cells are never Frontier, so they are interior and
            // all four neighbours are in bounds.
            for next in [current - size, current + size, current - 1, current + 1] {
                if previous[next] == UNVISITED && self.tiles[next] != Tile::Frontier {
                    previous[next] = current;
                    queue.push_back(next);
                }
            }
        }

        if previous[goal] == UNVISITED {
            return false;
        }

        let mut current = goal;
        path.push(self.cell(current));
        while current != start {
            current = previous[current];
            path.push(self.cell(current));
        }
        path.reverse();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            ChallengeKind::SortedList,
            ChallengeKind::ReverseSortedList,
            ChallengeKind::ShortestPath,
        ] {
            assert_eq!(kind.name().parse::<ChallengeKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert_eq!(
            "sorted_lists".parse::<ChallengeKind>(),
            Err(SolverError::UnknownChallengeKind("sorted_lists".into()))
        );
        assert!(ChallengeKind::try_from(3).is_err());
    }

    #[test]
    fn test_parameter_bounds() {
        assert!(ChallengeParameters::sorted_list(0).is_err());
        assert!(ChallengeParameters::sorted_list(MAX_LIST_ELEMENTS + 1).is_err());
        assert!(ChallengeParameters::reverse_sorted_list(1).is_ok());
        assert!(ChallengeParameters::shortest_path(MIN_GRID_SIZE - 1, 0).is_err());
        assert!(ChallengeParameters::shortest_path(MAX_GRID_SIZE + 1, 0).is_err());
        assert!(ChallengeParameters::shortest_path(10, 101).is_err());
        assert!(ChallengeParameters::shortest_path(10, 100).is_ok());
    }

    #[test]
    fn test_out_of_bounds_grid_rejected() {
        for size in [0, 1, 3, MAX_GRID_SIZE + 1] {
            assert!(matches!(
                Grid::generate(&mut Mt64::with_seed(1), size, 0),
                Err(SolverError::InvalidParameters(_))
            ));

            let mut workspace = Workspace::default();
            let mut checksum = crate::oracle::Sha256Checksum::default();
            assert!(
                feed_shortest_path(&mut Mt64::with_seed(1), &mut checksum, size, 0, &mut workspace)
                    .is_err()
            );
        }
        assert!(Grid::generate(&mut Mt64::with_seed(1), 4, 17).is_err());
    }

    #[test]
    fn test_unvalidated_small_grid_has_no_payload() {
        // Built without the validating constructor
        let params = ChallengeParameters::ShortestPath {
            grid_size: 3,
            nb_blockers: 0,
        };
        let mut workspace = Workspace::default();
        let mut checksum = crate::oracle::Sha256Checksum::default();
        assert!(!params.feed(&mut Mt64::with_seed(1), &mut checksum, &mut workspace));
    }

    #[test]
    fn test_grid_border_is_frontier() {
        let grid = Grid::generate(&mut Mt64::with_seed(1), 8, 0).unwrap();
        for i in 0..8 {
            assert_eq!(grid.tile(Cell { row: 0, col: i }), Tile::Frontier);
            assert_eq!(grid.tile(Cell { row: 7, col: i }), Tile::Frontier);
            assert_eq!(grid.tile(Cell { row: i, col: 0 }), Tile::Frontier);
            assert_eq!(grid.tile(Cell { row: i, col: 7 }), Tile::Frontier);
        }
        assert_eq!(grid.tile(grid.entry()), Tile::Entry);
        assert_eq!(grid.tile(grid.exit()), Tile::Exit);
        assert_ne!(grid.entry(), grid.exit());
    }

    #[test]
    fn test_open_grid_path_is_manhattan() {
        // Without blockers the BFS distance is the Manhattan distance
        for seed in 0..32 {
            let grid = Grid::generate(&mut Mt64::with_seed(seed), 12, 0).unwrap();
            let path = grid.shortest_path().expect("open grid is always solvable");
            let (entry, exit) = (grid.entry(), grid.exit());
            let manhattan = entry.row.abs_diff(exit.row) + entry.col.abs_diff(exit.col);

            assert_eq!(path.len(), manhattan + 1);
            assert_eq!(path.first(), Some(&entry));
            assert_eq!(path.last(), Some(&exit));
            for step in path.windows(2) {
                let d = step[0].row.abs_diff(step[1].row) + step[0].col.abs_diff(step[1].col);
                assert_eq!(d, 1);
            }
        }
    }

    #[test]
    fn test_path_avoids_blockers() {
        for seed in 0..64 {
            let grid = Grid::generate(&mut Mt64::with_seed(seed), 10, 30).unwrap();
            if let Some(path) = grid.shortest_path() {
                assert!(path.iter().all(|&c| grid.tile(c) != Tile::Frontier));
            }
        }
    }

    #[test]
    fn test_walled_exit_is_unsolvable() {
        // Hand-built grid: exit at (1, 1) sealed off by its two interior neighbours
        let mut grid = Grid::blank(5);
        grid.entry = Cell { row: 3, col: 3 };
        grid.exit = Cell { row: 1, col: 1 };
        let (entry, exit) = (grid.index(grid.entry), grid.index(grid.exit));
        grid.tiles[entry] = Tile::Entry;
        grid.tiles[exit] = Tile::Exit;
        let right = grid.index(Cell { row: 1, col: 2 });
        let below = grid.index(Cell { row: 2, col: 1 });
        grid.tiles[right] = Tile::Frontier;
        grid.tiles[below] = Tile::Frontier;

        assert_eq!(grid.shortest_path(), None);
    }

    #[test]
    fn test_workspace_grid_matches_generate() {
        let params = ChallengeParameters::shortest_path(16, 40).unwrap();
        let mut workspace = Workspace::new(&params);
        let mut checksum = crate::oracle::Sha256Checksum::default();

        let solved = params.feed(&mut Mt64::with_seed(99), &mut checksum, &mut workspace);
        let grid = Grid::generate(&mut Mt64::with_seed(99), 16, 40).unwrap();

        assert_eq!(workspace.grid().tiles, grid.tiles);
        assert_eq!(solved, grid.shortest_path().is_some());
        if solved {
            assert_eq!(Some(workspace.path().to_vec()), grid.shortest_path());
        }
    }
}
