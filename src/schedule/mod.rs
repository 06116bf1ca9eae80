pub mod availability;
pub mod codec;
pub mod gesture;
pub mod overlap;
pub mod scoring;
pub mod slots;

pub use availability::{WeeklyAvailability, WeeklyPayload};
pub use codec::{DaySlotSet, DecodePolicy, SlotSetCodec};
pub use gesture::{Cell, CellRenderer, GestureState, NullRenderer, PaintMode, SelectionGestureController};
pub use overlap::{Highlight, OverlapResult};
pub use slots::{Day, Slot, SlotCatalog, MAX_SLOTS_PER_DAY};
