//! playpen-browser: DOM implementations of the playpen capabilities.
//!
//! - `IframeSurface` - renders composed documents into an iframe
//! - `MessageBridge` - window `message` events to the feedback channel
//! - `TimeoutScheduler` - debouncing on browser timers
//! - `LocalStore` - persistence in `localStorage`
//! - `DomView` - console, toasts, gutters and editors on the host page
//!
//! `BrowserPlatform` bundles these for `PlaygroundSession`.

pub mod bridge;
pub mod events;
pub mod ids;
pub mod platform;
pub mod scheduler;
pub mod storage;
pub mod surface;
pub mod view;

pub use playpen_core;
pub use playpen_core::*;

pub use bridge::MessageBridge;
pub use events::{char_to_utf16_offset, combo_from_keyboard_event, utf16_to_char_offset};
pub use ids::DomIds;
pub use platform::{BrowserPlatform, is_mac};
pub use scheduler::TimeoutScheduler;
pub use storage::LocalStore;
pub use surface::IframeSurface;
pub use view::DomView;
