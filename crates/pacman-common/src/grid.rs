use parking_lot::{Mutex, MutexGuard};

use crate::cell::Cell;

/// A `W x H` row-major grid of individually-locked cells.
///
/// Dimensions are fixed at construction (level load); there is no
/// resize. Every call site that needs to mutate more than one cell in
/// a single atomic step goes through [`Grid::with_cells_locked`] or
/// [`Grid::with_strip_locked`] -- never locks cells ad hoc -- which is
/// the whole deadlock-freedom argument for the move engine.
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Mutex<Cell>>,
}

/// Mutable access to two cells locked in ascending index order.
///
/// When the two requested indices are equal, `hi` is `None` and both
/// logical positions alias `lo` -- callers that need "the one cell"
/// twice (there are none in this engine, but the shape is kept honest)
/// use [`CellPair::get`] rather than assuming two distinct guards.
pub struct CellPair<'a> {
    lo_idx: usize,
    hi_idx: usize,
    lo: MutexGuard<'a, Cell>,
    hi: Option<MutexGuard<'a, Cell>>,
}

impl<'a> CellPair<'a> {
    /// Borrow the cell at `idx`, which must be one of the two indices
    /// this pair was constructed with.
    pub fn get(&self, idx: usize) -> &Cell {
        if idx == self.lo_idx {
            &self.lo
        } else if idx == self.hi_idx {
            self.hi.as_deref().unwrap_or(&self.lo)
        } else {
            panic!("CellPair::get: index {idx} not in ({}, {})", self.lo_idx, self.hi_idx);
        }
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Cell {
        if idx == self.lo_idx {
            &mut self.lo
        } else if idx == self.hi_idx {
            self.hi.as_deref_mut().unwrap_or(&mut self.lo)
        } else {
            panic!("CellPair::get_mut: index {idx} not in ({}, {})", self.lo_idx, self.hi_idx);
        }
    }
}

impl Grid {
    /// Build a grid from already-decorated cells in row-major order.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Grid {
        assert_eq!(cells.len(), width * height, "cell count must match width * height");
        Grid {
            width,
            height,
            cells: cells.into_iter().map(Mutex::new).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Snapshot a single cell without taking part in a multi-cell
    /// locked operation (used by the notifier, which only reads).
    pub fn snapshot(&self, idx: usize) -> Cell {
        *self.cells[idx].lock()
    }

    /// Acquire `cells[min(i, j)]` then `cells[max(i, j)]`, run `f`, and
    /// release in reverse order. When `i == j`, takes the one lock.
    pub fn with_cells_locked<R>(&self, i: usize, j: usize, f: impl FnOnce(&mut CellPair) -> R) -> R {
        let (lo_idx, hi_idx) = if i <= j { (i, j) } else { (j, i) };
        let lo = self.cells[lo_idx].lock();
        let hi = if lo_idx == hi_idx {
            None
        } else {
            Some(self.cells[hi_idx].lock())
        };
        let mut pair = CellPair { lo_idx, hi_idx, lo, hi };
        f(&mut pair)
    }

    /// Acquire every cell index in `indices` (already sorted ascending)
    /// in that order, run `f` with mutable access to each locked cell
    /// by index, and release all locks afterward.
    ///
    /// Used only by the charged sweep, which must observe a consistent
    /// strip of the board rather than only its endpoints: another
    /// actor entering the strip mid-sweep could otherwise flip the
    /// chosen target.
    pub fn with_strip_locked<R>(&self, indices: &[usize], f: impl FnOnce(&mut StripGuard) -> R) -> R {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]), "indices must be strictly ascending");
        let guards: Vec<MutexGuard<'_, Cell>> = indices.iter().map(|&idx| self.cells[idx].lock()).collect();
        let mut strip = StripGuard {
            indices,
            guards,
        };
        f(&mut strip)
    }
}

/// Mutable access to a whole locked strip of cells, indexed by their
/// grid index (not their position within the strip).
pub struct StripGuard<'a> {
    indices: &'a [usize],
    guards: Vec<MutexGuard<'a, Cell>>,
}

impl<'a> StripGuard<'a> {
    pub fn get(&self, idx: usize) -> &Cell {
        let pos = self.indices.iter().position(|&i| i == idx).expect("index not in strip");
        &self.guards[pos]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Cell {
        let pos = self.indices.iter().position(|&i| i == idx).expect("index not in strip");
        &mut self.guards[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Content;
    use std::sync::Arc;

    fn flat_grid(w: usize, h: usize) -> Grid {
        Grid::from_cells(w, h, vec![Cell::empty(); w * h])
    }

    #[test]
    fn with_cells_locked_orders_by_index_not_argument_order() {
        let grid = flat_grid(3, 3);
        grid.with_cells_locked(5, 1, |pair| {
            pair.get_mut(5).content = Content::Player;
            pair.get_mut(1).content = Content::Ghost;
        });
        assert_eq!(grid.snapshot(5).content, Content::Player);
        assert_eq!(grid.snapshot(1).content, Content::Ghost);
    }

    #[test]
    fn with_cells_locked_same_index_aliases() {
        let grid = flat_grid(3, 3);
        grid.with_cells_locked(2, 2, |pair| {
            pair.get_mut(2).has_dot = true;
        });
        assert!(grid.snapshot(2).has_dot);
    }

    #[test]
    fn with_strip_locked_covers_whole_range() {
        let grid = flat_grid(1, 5);
        grid.with_strip_locked(&[0, 1, 2, 3, 4], |strip| {
            for idx in 0..5 {
                strip.get_mut(idx).has_dot = idx % 2 == 0;
            }
        });
        for idx in 0..5 {
            assert_eq!(grid.snapshot(idx).has_dot, idx % 2 == 0);
        }
    }

    #[test]
    fn concurrent_moves_do_not_deadlock() {
        // Two threads racing for overlapping adjacent cell pairs must
        // always make progress -- this is the deadlock-freedom property
        // the ascending-lock-order rule exists to guarantee.
        let grid = Arc::new(flat_grid(4, 4));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let grid = Arc::clone(&grid);
            handles.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    grid.with_cells_locked(5, 6, |pair| {
                        let _ = pair.get(5);
                        let _ = pair.get(6);
                    });
                    grid.with_cells_locked(6, 5, |pair| {
                        let _ = pair.get(5);
                        let _ = pair.get(6);
                    });
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
