pub mod commands;
pub mod config;
pub mod inbound;
pub mod ws_client;

#[cfg(test)]
pub(crate) mod tests;

pub use commands::{CommandEnvelope, CommandKind};
pub use inbound::ServerMessage;
pub use ws_client::{ConnectionState, IWsClient, TransportError, WsClient, WsConfig};

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::RwLock;

use config::ApiConfig;
use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::messages::Message;

lazy_static! {
    static ref API_CONFIG: RwLock<Option<ApiConfig>> = RwLock::new(None);
}

thread_local! {
    static WS_CLIENT: RefCell<Option<Rc<RefCell<dyn IWsClient>>>> = RefCell::new(None);
}

/// Initialize the configuration from the compile-time `API_BASE_URL`.
pub fn init_api_config() -> Result<(), &'static str> {
    let config = ApiConfig::new()?;
    set_api_config(config);
    Ok(())
}

/// Initialize the configuration from a JS-provided URL.
#[wasm_bindgen]
pub fn init_api_config_js(api_base_url: &str) -> Result<(), JsValue> {
    debug_log!("Initializing API config from JS: {}", api_base_url);
    set_api_config(ApiConfig::from_url(api_base_url));
    Ok(())
}

fn set_api_config(config: ApiConfig) {
    match API_CONFIG.write() {
        Ok(mut guard) => *guard = Some(config),
        Err(poisoned) => *poisoned.into_inner() = Some(config),
    }
}

pub(crate) fn configured_ws_url() -> Option<String> {
    API_CONFIG
        .read()
        .ok()
        .and_then(|guard| guard.as_ref().map(ApiConfig::ws_url))
}

/// WebSocket URL from the configuration, falling back to same-origin.
pub(crate) fn get_ws_url() -> Result<String, &'static str> {
    if let Some(url) = configured_ws_url() {
        return Ok(url);
    }
    let win = web_sys::window().ok_or("window unavailable")?;
    let loc = win.location();
    let host = loc.host().map_err(|_| "host unavailable")?;
    let proto = loc.protocol().map_err(|_| "protocol unavailable")?;
    let ws_scheme = if proto == "https:" { "wss" } else { "ws" };
    Ok(format!("{}://{}{}", ws_scheme, host, config::WS_PATH))
}

/// Make `client` the transport used by [`send_command`].
pub fn install_client(client: Rc<RefCell<dyn IWsClient>>) {
    WS_CLIENT.with(|slot| *slot.borrow_mut() = Some(client));
}

/// Serialize `envelope` and hand it to the installed transport.
pub fn send_command(envelope: &CommandEnvelope) -> Result<(), TransportError> {
    let json = envelope.to_json()?;
    debug_log!("Sending command: {}", json);
    WS_CLIENT.with(|slot| {
        let slot = slot.borrow();
        let client = slot.as_ref().ok_or(TransportError::NotInitialized)?;
        let client = client
            .try_borrow()
            .map_err(|_| TransportError::Socket("transport is busy".to_string()))?;
        client.send_serialized_message(&json)
    })
}

/// Parse a raw frame and translate it for the reducer.
pub fn message_from_text(text: &str) -> Option<Message> {
    match ServerMessage::parse(text) {
        Ok(frame) => inbound::route(frame),
        Err(e) => {
            warn_log!("Failed to parse incoming frame as JSON: {} ({})", text, e);
            None
        }
    }
}

/// Create the WebSocket transport, wire its callbacks into the dispatcher
/// and connect.
pub fn setup_websocket() -> Result<(), JsValue> {
    let url = get_ws_url().map_err(JsValue::from_str)?;
    let mut client = WsClient::new(WsConfig::new(url));

    client.set_on_connect(Box::new(|| {
        crate::state::dispatch_global_message(Message::ConnectionOpened);
    }));
    client.set_on_message(Box::new(|text: String| {
        if let Some(msg) = message_from_text(&text) {
            crate::state::dispatch_global_message(msg);
        }
    }));
    client.set_on_disconnect(Box::new(|| {
        crate::state::dispatch_global_message(Message::ConnectionLost);
    }));

    let client: Rc<RefCell<dyn IWsClient>> = Rc::new(RefCell::new(client));
    install_client(client.clone());
    client.borrow_mut().connect()?;
    Ok(())
}

/// Entry point for hosts that own the connection themselves: deliver one
/// backend frame, either as a JS object or as a JSON string.
#[wasm_bindgen]
pub fn receive_server_message(frame: JsValue) -> Result<(), JsValue> {
    let parsed = match frame.as_string() {
        Some(text) => ServerMessage::parse(&text).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => serde_wasm_bindgen::from_value::<ServerMessage>(frame)?,
    };
    if let Some(msg) = inbound::route(parsed) {
        crate::state::dispatch_global_message(msg);
    }
    Ok(())
}
