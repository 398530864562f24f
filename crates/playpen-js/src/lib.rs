//! WASM bindings for the playpen live playground.
//!
//! Mounts a playground onto an existing page: three textareas, a preview
//! iframe and the console, toast and toolbar elements, located by id.

mod playground;
mod types;

pub use playground::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
