#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (state arenas, event queues)
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod event;

// --- State-Machine Engine ---
pub mod engine;

// --- Function-Module Boundary ---
pub mod fm;

// --- Hardware Sequences ---
pub mod sequence;

// --- Device Assemblies ---
pub mod device;

// --- Top-level Exports ---
pub use types::{HoodState, InstanceId, ReturnCode};
pub use event::{Event, EventKind};
pub use engine::{EngineError, Outbox, StateId, StateKind, StateMachine};
pub use fm::{FunctionModule, MockFunctionModule, SharedFm};
pub use device::{Device, Drawer, DrawerFunctionModules, Hood, HoodFunctionModules, LogicalDevice};
