//! Thermo Schedule - Heating schedule model and drag-editing engine
//!
//! A thermostat schedule is a list of up to six transitions per day, each
//! saying "from this time on, hold this temperature". This crate parses and
//! serializes the device's compact transport strings, auto-fixes schedules
//! into canonical form, validates them, and drives the interactive graph
//! editor: coordinate mapping, hit testing and the press/drag/release
//! gesture state machine.
//!
//! ## Modules
//!
//! - **Model**: `types`, `codec`, `normalizer`, `validator`
//! - **Editing**: `coords`, `gesture`, `editor`
//! - **Host integration**: `config`, `ffi`

pub mod codec;
pub mod config;
pub mod coords;
pub mod editor;
pub mod error;
pub mod gesture;
pub mod normalizer;
pub mod types;
pub mod validator;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use codec::{parse_day, serialize_day, WeeklyTransport};
pub use config::EditorConfig;
pub use editor::{EditorEvent, ScheduleEditor};
pub use error::ScheduleError;
pub use normalizer::Normalizer;
pub use types::{DayKey, DaySchedule, TimeOfDay, Transition, TransitionId, WeeklySchedule};
pub use validator::{ValidationReport, Validator, Violation};

/// Library version
pub const THERMO_VERSION: &str = env!("CARGO_PKG_VERSION");
