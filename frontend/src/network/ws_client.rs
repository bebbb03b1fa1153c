use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

/// Failures of the command transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    NotInitialized,
    NotConnected,
    Serialize(String),
    Socket(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::NotInitialized => write!(f, "WebSocket is not initialized"),
            TransportError::NotConnected => write!(f, "WebSocket is not connected"),
            TransportError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            TransportError::Socket(msg) => write!(f, "WebSocket error: {}", msg),
        }
    }
}

impl From<TransportError> for JsValue {
    fn from(err: TransportError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialize(err.to_string())
    }
}

/// Trait defining the command transport. Implemented by the WebSocket
/// client below and by test doubles.
pub trait IWsClient {
    fn connect(&mut self) -> Result<(), TransportError>;
    fn send_serialized_message(&self, message_json: &str) -> Result<(), TransportError>;
    fn connection_state(&self) -> ConnectionState;
    fn close(&mut self) -> Result<(), TransportError>;
    fn set_on_connect(&mut self, callback: Box<dyn FnMut() + 'static>);
    fn set_on_message(&mut self, callback: Box<dyn FnMut(String) + 'static>);
    fn set_on_disconnect(&mut self, callback: Box<dyn FnMut() + 'static>);
}

/// Represents the current state of the WebSocket connection
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

/// Configuration for the WebSocket client
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u32,
    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u32,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            initial_backoff_ms: 1000,
            max_backoff_ms: 30000,
        }
    }
}

type OnConnectCallback = Rc<RefCell<Box<dyn FnMut()>>>;
type OnMessageCallback = Rc<RefCell<Box<dyn FnMut(String)>>>;
type OnDisconnectCallback = Rc<RefCell<Box<dyn FnMut()>>>;

/// WebSocket implementation of [`IWsClient`] with exponential-backoff
/// reconnects.
pub struct WsClient {
    config: WsConfig,
    websocket: Rc<RefCell<Option<WebSocket>>>,
    state: Rc<RefCell<ConnectionState>>,
    reconnect_attempt: Rc<RefCell<u32>>,
    reconnect_timeout: Rc<RefCell<Option<i32>>>,
    closed_by_client: Rc<RefCell<bool>>,

    on_connect_callback: Option<OnConnectCallback>,
    on_message_callback: Option<OnMessageCallback>,
    on_disconnect_callback: Option<OnDisconnectCallback>,
}

impl WsClient {
    pub fn new(config: WsConfig) -> Self {
        Self {
            config,
            websocket: Rc::new(RefCell::new(None)),
            state: Rc::new(RefCell::new(ConnectionState::Disconnected)),
            reconnect_attempt: Rc::new(RefCell::new(0)),
            reconnect_timeout: Rc::new(RefCell::new(None)),
            closed_by_client: Rc::new(RefCell::new(false)),
            on_connect_callback: None,
            on_message_callback: None,
            on_disconnect_callback: None,
        }
    }

    /// Calculate the backoff delay for the next reconnection attempt
    fn get_backoff_ms(&self) -> u32 {
        let attempt = *self.reconnect_attempt.borrow();
        let delay = self
            .config
            .initial_backoff_ms
            .saturating_mul(2_u32.pow(attempt.min(10)));
        delay.min(self.config.max_backoff_ms)
    }

    /// Creates the socket and attaches handlers. Used by both `connect` and
    /// the reconnect timer.
    fn establish_connection(&self) -> Result<WebSocket, JsValue> {
        let ws = WebSocket::new(&self.config.url)?;

        let state_clone = self.state.clone();
        let reconnect_attempt_clone = self.reconnect_attempt.clone();
        let on_connect_cb = self.on_connect_callback.clone();
        let onopen_closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
            web_sys::console::log_1(&"WebSocket connected".into());
            *state_clone.borrow_mut() = ConnectionState::Connected;
            *reconnect_attempt_clone.borrow_mut() = 0;
            if let Some(callback_rc) = &on_connect_cb {
                (callback_rc.borrow_mut())();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onopen(Some(onopen_closure.as_ref().unchecked_ref()));
        onopen_closure.forget();

        let onerror_closure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            // onclose follows and handles the state change
            web_sys::console::error_1(&format!("WebSocket error: {:?}", e.type_()).into());
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onerror(Some(onerror_closure.as_ref().unchecked_ref()));
        onerror_closure.forget();

        let state_clone = self.state.clone();
        let reconnect_attempt_clone = self.reconnect_attempt.clone();
        let on_disconnect_cb = self.on_disconnect_callback.clone();
        let client_for_reconnect = self.clone();
        let closed_by_client = self.closed_by_client.clone();
        let onclose_closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
            web_sys::console::log_1(&"WebSocket closed".into());
            *state_clone.borrow_mut() = ConnectionState::Disconnected;

            if let Some(callback_rc) = &on_disconnect_cb {
                (callback_rc.borrow_mut())();
            }

            if *closed_by_client.borrow() {
                return;
            }
            *reconnect_attempt_clone.borrow_mut() += 1;
            client_for_reconnect.schedule_reconnect();
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onclose(Some(onclose_closure.as_ref().unchecked_ref()));
        onclose_closure.forget();

        let on_message_cb = self.on_message_callback.clone();
        let onmessage_closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => {
                    if let Some(callback_rc) = &on_message_cb {
                        (callback_rc.borrow_mut())(text);
                    }
                }
                None => web_sys::console::warn_1(&"Received non-text WebSocket message".into()),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage_closure.as_ref().unchecked_ref()));
        onmessage_closure.forget();

        Ok(ws)
    }

    /// Schedule a reconnection attempt with exponential backoff
    fn schedule_reconnect(&self) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let delay = self.get_backoff_ms();
        let client = self.clone();

        let reconnect_callback = Closure::once_into_js(move || {
            if *client.state.borrow() != ConnectionState::Disconnected {
                return;
            }
            web_sys::console::log_1(
                &format!("Attempting reconnection (attempt {})", *client.reconnect_attempt.borrow()).into(),
            );
            *client.state.borrow_mut() = ConnectionState::Connecting;
            match client.establish_connection() {
                Ok(ws) => {
                    *client.websocket.borrow_mut() = Some(ws);
                }
                Err(e) => {
                    web_sys::console::error_1(
                        &format!("Failed to create WebSocket during reconnect: {:?}", e).into(),
                    );
                    *client.state.borrow_mut() = ConnectionState::Disconnected;
                    *client.reconnect_attempt.borrow_mut() += 1;
                    client.schedule_reconnect();
                }
            }
        });

        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            reconnect_callback.unchecked_ref(),
            delay as i32,
        ) {
            Ok(timeout_id) => *self.reconnect_timeout.borrow_mut() = Some(timeout_id),
            Err(e) => web_sys::console::error_1(&format!("Failed to schedule reconnection: {:?}", e).into()),
        }
    }

    fn clear_reconnect_timeout(&self) {
        if let Some(timeout_id) = self.reconnect_timeout.borrow_mut().take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(timeout_id);
            }
        }
    }
}

impl IWsClient for WsClient {
    fn connect(&mut self) -> Result<(), TransportError> {
        web_sys::console::log_1(&format!("Connecting to {}", self.config.url).into());
        *self.reconnect_attempt.borrow_mut() = 0;
        *self.closed_by_client.borrow_mut() = false;
        *self.state.borrow_mut() = ConnectionState::Connecting;

        let ws = self
            .establish_connection()
            .map_err(|e| TransportError::Socket(format!("{:?}", e)))?;
        self.clear_reconnect_timeout();
        *self.websocket.borrow_mut() = Some(ws);
        Ok(())
    }

    fn send_serialized_message(&self, message_json: &str) -> Result<(), TransportError> {
        let socket = self.websocket.borrow();
        let ws = socket.as_ref().ok_or(TransportError::NotInitialized)?;
        if *self.state.borrow() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        ws.send_with_str(message_json)
            .map_err(|e| TransportError::Socket(format!("{:?}", e)))
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.clear_reconnect_timeout();
        *self.closed_by_client.borrow_mut() = true;
        *self.state.borrow_mut() = ConnectionState::Disconnected;
        if let Some(ws) = self.websocket.borrow_mut().take() {
            ws.close_with_code(1000)
                .map_err(|e| TransportError::Socket(format!("{:?}", e)))?;
        }
        Ok(())
    }

    fn set_on_connect(&mut self, callback: Box<dyn FnMut() + 'static>) {
        self.on_connect_callback = Some(Rc::new(RefCell::new(callback)));
    }

    fn set_on_message(&mut self, callback: Box<dyn FnMut(String) + 'static>) {
        self.on_message_callback = Some(Rc::new(RefCell::new(callback)));
    }

    fn set_on_disconnect(&mut self, callback: Box<dyn FnMut() + 'static>) {
        self.on_disconnect_callback = Some(Rc::new(RefCell::new(callback)));
    }
}

impl Clone for WsClient {
    /// Shares the socket slot, state and callbacks; used to move the client
    /// into reconnect closures.
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            websocket: self.websocket.clone(),
            state: self.state.clone(),
            reconnect_attempt: self.reconnect_attempt.clone(),
            reconnect_timeout: self.reconnect_timeout.clone(),
            closed_by_client: self.closed_by_client.clone(),
            on_connect_callback: self.on_connect_callback.clone(),
            on_message_callback: self.on_message_callback.clone(),
            on_disconnect_callback: self.on_disconnect_callback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WsClient {
        WsClient::new(WsConfig::new("ws://localhost/ws"))
    }

    #[test]
    fn new_client_is_disconnected() {
        assert_eq!(client().connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let client = client();
        assert_eq!(client.get_backoff_ms(), 1000);

        *client.reconnect_attempt.borrow_mut() = 1;
        assert_eq!(client.get_backoff_ms(), 2000);

        *client.reconnect_attempt.borrow_mut() = 4;
        assert_eq!(client.get_backoff_ms(), 16000);

        *client.reconnect_attempt.borrow_mut() = 10;
        assert_eq!(client.get_backoff_ms(), 30000);

        *client.reconnect_attempt.borrow_mut() = u32::MAX;
        assert_eq!(client.get_backoff_ms(), 30000);
    }

    #[test]
    fn send_without_socket_fails() {
        let client = client();
        assert_eq!(client.send_serialized_message("{}"), Err(TransportError::NotInitialized));
    }

    #[test]
    fn clones_share_state() {
        let a = client();
        let b = a.clone();
        *a.state.borrow_mut() = ConnectionState::Connecting;
        assert_eq!(b.connection_state(), ConnectionState::Connecting);
    }

    #[test]
    fn error_messages() {
        assert_eq!(TransportError::NotConnected.to_string(), "WebSocket is not connected");
        assert_eq!(
            TransportError::Serialize("eof".into()).to_string(),
            "Serialization error: eof"
        );
    }
}
