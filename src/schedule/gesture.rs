use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::{log_debug, log_warn};

use super::{availability::WeeklyAvailability, slots::Day};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PaintMode {
    Selecting,
    Deselecting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(PaintMode),
}

impl GestureState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, GestureState::Dragging(_))
    }

    pub fn mode(&self) -> Option<PaintMode> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging(mode) => Some(*mode),
        }
    }
}

/// One cell of the grid: a day column and a slot row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub day: Day,
    pub slot: usize,
}

impl Cell {
    pub fn new(day: Day, slot: usize) -> Self {
        Self { day, slot }
    }
}

/// Receives exactly one call per cell whose selection actually changed.
pub trait CellRenderer {
    fn render(&mut self, cell: Cell, selected: bool);
}

/// Discards updates; for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl CellRenderer for NullRenderer {
    fn render(&mut self, _cell: Cell, _selected: bool) {}
}

/// Records updates in order.
impl CellRenderer for Vec<(Cell, bool)> {
    fn render(&mut self, cell: Cell, selected: bool) {
        self.push((cell, selected));
    }
}

/// Turns pointer events on grid cells into selections.
///
/// The paint mode is fixed on press from the first cell's state and then
/// applied to every cell entered until release, so dragging back over a
/// visited cell never toggles it.
#[derive(Debug)]
pub struct SelectionGestureController<R: CellRenderer = NullRenderer> {
    availability: WeeklyAvailability,
    renderer: R,
    state: GestureState,
}

impl SelectionGestureController<NullRenderer> {
    pub fn headless(availability: WeeklyAvailability) -> Self {
        Self::new(availability, NullRenderer)
    }
}

impl<R: CellRenderer> SelectionGestureController<R> {
    pub fn new(availability: WeeklyAvailability, renderer: R) -> Self {
        Self {
            availability,
            renderer,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn availability(&self) -> &WeeklyAvailability {
        &self.availability
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_availability(self) -> WeeklyAvailability {
        self.availability
    }

    /// Starts a drag. A rejected cell leaves the state untouched.
    pub fn on_pointer_down(&mut self, cell: Cell) -> Result<PaintMode, ScheduleError> {
        self.availability.catalog().check_index(cell.slot)?;

        if self.state.is_dragging() {
            log_warn!("Pointer down while still dragging; previous pointer up was lost");
        }

        let mode = if self.availability.is_selected_index(cell.day, cell.slot) {
            PaintMode::Deselecting
        } else {
            PaintMode::Selecting
        };
        self.apply(mode, cell)?;
        self.state = GestureState::Dragging(mode);
        log_debug!("Drag started at {:?} in {:?} mode", cell, mode);
        Ok(mode)
    }

    /// Paints `cell` while dragging. Returns whether the cell changed.
    pub fn on_pointer_enter(&mut self, cell: Cell) -> Result<bool, ScheduleError> {
        match self.state {
            GestureState::Idle => Ok(false),
            GestureState::Dragging(mode) => self.apply(mode, cell),
        }
    }

    pub fn on_pointer_up(&mut self) {
        if self.state.is_dragging() {
            log_debug!("Drag ended");
        }
        self.state = GestureState::Idle;
    }

    /// For a document-wide release listener, so a pointer up outside the grid
    /// cannot leave a drag running.
    pub fn force_idle(&mut self) {
        if self.state.is_dragging() {
            log_warn!("Forcing gesture controller back to idle");
        }
        self.state = GestureState::Idle;
    }

    /// Deselects every cell, rendering each one that was selected.
    pub fn clear(&mut self) {
        for day in Day::ALL {
            for slot in self.availability.day(day).iter() {
                self.renderer.render(Cell::new(day, slot), false);
            }
        }
        self.availability.clear();
        self.state = GestureState::Idle;
    }

    fn apply(&mut self, mode: PaintMode, cell: Cell) -> Result<bool, ScheduleError> {
        let changed = match mode {
            PaintMode::Selecting => self.availability.select_index(cell.day, cell.slot)?,
            PaintMode::Deselecting => self.availability.deselect_index(cell.day, cell.slot)?,
        };
        if changed {
            self.renderer.render(cell, mode == PaintMode::Selecting);
        }
        Ok(changed)
    }
}
