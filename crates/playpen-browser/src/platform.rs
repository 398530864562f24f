//! Browser capabilities for a playground session.

use std::sync::OnceLock;

use crate::scheduler::TimeoutScheduler;
use crate::storage::LocalStore;
use crate::surface::IframeSurface;
use crate::view::DomView;

/// A session running in a browser page.
pub struct BrowserPlatform;

impl playpen_core::Platform for BrowserPlatform {
    type Surface = IframeSurface;
    type Scheduler = TimeoutScheduler;
    type Store = LocalStore;
    type View = DomView;

    fn is_mac() -> bool {
        is_mac()
    }
}

static IS_MAC: OnceLock<bool> = OnceLock::new();

/// Whether the page runs on macOS (Cmd is the primary modifier). Detection
/// runs once on first call.
pub fn is_mac() -> bool {
    *IS_MAC.get_or_init(detect_mac)
}

fn detect_mac() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let navigator = window.navigator();
    let platform = navigator.platform().unwrap_or_default().to_lowercase();
    let user_agent = navigator.user_agent().unwrap_or_default().to_lowercase();
    let ios = user_agent.contains("iphone")
        || user_agent.contains("ipad")
        || (platform.contains("mac") && navigator.max_touch_points() > 0);
    platform.contains("mac") && !ios
}
