use wasm_bindgen::prelude::*;

#[macro_use]
mod macros;

pub mod command_executors;
pub mod constants;
pub mod dom_utils;
pub mod guard;
pub mod messages; // Message / Command enums
pub mod models;
pub mod network;
pub mod registry;
pub mod state;
pub mod toast;
pub mod update; // Reducer
pub mod views;

use messages::Message;

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();

    // Compile-time API_BASE_URL when present; the host page may still call
    // `init_api_config_js` later, otherwise the socket goes to same-origin.
    if let Err(e) = network::init_api_config() {
        debug_log!("No compile-time API config: {}", e);
    }

    let document = dom_utils::document()?;

    // Create the containers and the view model
    views::mount(&document)?;

    // Set up the WebSocket connection; lists are requested once it opens
    network::setup_websocket()?;

    Ok(())
}

/// Clear and re-request the group list.
#[wasm_bindgen]
pub fn refresh_groups() {
    state::dispatch_global_message(Message::RefreshGroups);
}

/// Clear and re-request the user list.
#[wasm_bindgen]
pub fn refresh_users() {
    state::dispatch_global_message(Message::RefreshUsers);
}

/// Re-request the members of one group.
#[wasm_bindgen]
pub fn refresh_group(group_id: &str) {
    state::dispatch_global_message(Message::RefreshGroup(group_id.to_string()));
}
