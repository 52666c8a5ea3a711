use parking_lot::Mutex;

use pacman_common::{Cell, Ghost, Grid, Player};
use pacman_level::LoadedLevel;

/// One level's worth of mutable game state: the grid (individually
/// locked per cell, see [`Grid`]) plus the player and ghosts, each
/// behind their own mutex so unrelated actors never serialize on each
/// other's bookkeeping -- only on the grid cells they actually touch.
pub struct SessionBoard {
    pub grid: Grid,
    pub player: Mutex<Player>,
    pub ghosts: Vec<Mutex<Ghost>>,
    pub tempo: u32,
    pub level_name: String,
}

impl SessionBoard {
    pub fn from_loaded(loaded: LoadedLevel) -> SessionBoard {
        SessionBoard {
            grid: loaded.grid,
            player: Mutex::new(loaded.player),
            ghosts: loaded.ghosts.into_iter().map(Mutex::new).collect(),
            tempo: loaded.tempo,
            level_name: loaded.name,
        }
    }

    /// A full row-major copy of the grid's cells, for the notifier.
    pub fn snapshot_cells(&self) -> Vec<Cell> {
        (0..self.grid.width() * self.grid.height()).map(|idx| self.grid.snapshot(idx)).collect()
    }

    pub fn accumulated_points(&self) -> u32 {
        self.player.lock().points
    }
}
