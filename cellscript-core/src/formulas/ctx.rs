//! Formula execution context and the cell store interface.

use std::collections::HashMap;

use super::cell_ref::CellRef;
use super::values::Value;
use super::MAX_FORMULA_DEPTH;

/// Read-only lookup into the host's cell grid. Rows and columns are 1-based.
/// An absent cell is distinguishable from a stored `Blank`: `get` returns
/// `None` for the former. The engine makes no assumption about the store's
/// physical representation.
pub trait CellStore {
    fn get(&self, row: i32, col: i32) -> Option<Value>;
}

impl CellStore for HashMap<(i32, i32), Value> {
    fn get(&self, row: i32, col: i32) -> Option<Value> {
        HashMap::get(self, &(row, col)).cloned()
    }
}

/// Formula execution context: the borrowed cell store plus the evaluation
/// depth guard.
pub struct Ctx<'a> {
    pub cells: &'a dyn CellStore,
    depth: usize,
}
impl<'a> Ctx<'a> {
    pub fn new(cells: &'a dyn CellStore) -> Self {
        Self { cells, depth: 0 }
    }

    /// Fetches the contents of a cell. A missing cell reads as `Blank`.
    pub fn get_cell(&self, cell: CellRef) -> Value {
        self.cells.get(cell.row, cell.col).unwrap_or(Value::Blank)
    }

    /// Enters one level of evaluation nesting; returns `false` if the depth
    /// limit is exhausted. Callers that observe `false` must not call
    /// [`Self::exit`].
    pub(super) fn enter(&mut self) -> bool {
        if self.depth >= MAX_FORMULA_DEPTH {
            false
        } else {
            self.depth += 1;
            true
        }
    }
    pub(super) fn exit(&mut self) {
        self.depth -= 1;
    }
}
