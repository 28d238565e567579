//! Drag/gesture engine
//!
//! Turns pointer and touch input into live previews and committed edits of
//! a day schedule.
//!
//! Pipeline: InputEvent → hit test → DragMachine → GestureOutput

pub mod events;
pub mod hit;
pub mod machine;

pub use events::{GestureOutput, InputEvent, PointerEvent, PointerSource};
pub use hit::hit_test;
pub use machine::{snap_time, DragMachine, DragState, Grab};
