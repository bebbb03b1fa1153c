use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use super::ws_client::{ConnectionState, IWsClient, TransportError};
use super::{commands, install_client, message_from_text, send_command};
use crate::messages::Message;
use crate::models::EntityType;

// Mock transport recording what would go over the wire
#[derive(Clone)]
pub(crate) struct MockWsClient {
    state: Rc<RefCell<ConnectionState>>,
    sent_messages: Rc<RefCell<Vec<String>>>,
}

impl MockWsClient {
    pub(crate) fn new(state: ConnectionState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
            sent_messages: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn sent_values(&self) -> Vec<Value> {
        self.sent_messages
            .borrow()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }
}

impl IWsClient for MockWsClient {
    fn connect(&mut self) -> Result<(), TransportError> {
        *self.state.borrow_mut() = ConnectionState::Connected;
        Ok(())
    }

    fn send_serialized_message(&self, message_json: &str) -> Result<(), TransportError> {
        if *self.state.borrow() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        self.sent_messages.borrow_mut().push(message_json.to_string());
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        *self.state.borrow_mut() = ConnectionState::Disconnected;
        Ok(())
    }

    fn set_on_connect(&mut self, _callback: Box<dyn FnMut() + 'static>) {}
    fn set_on_message(&mut self, _callback: Box<dyn FnMut(String) + 'static>) {}
    fn set_on_disconnect(&mut self, _callback: Box<dyn FnMut() + 'static>) {}
}

#[test]
fn send_command_serializes_through_installed_client() {
    let mock = MockWsClient::new(ConnectionState::Connected);
    install_client(Rc::new(RefCell::new(mock.clone())));

    send_command(&commands::list(EntityType::Group)).unwrap();
    send_command(&commands::add_to_group("u1", "g1")).unwrap();

    assert_eq!(
        mock.sent_values(),
        vec![
            json!({ "command": "LIST", "data": { "type": "Group" } }),
            json!({ "command": "ADD", "id": "g1", "data": { "id": "u1" } }),
        ]
    );
}

#[test]
fn send_command_reports_disconnected_transport() {
    let mock = MockWsClient::new(ConnectionState::Disconnected);
    install_client(Rc::new(RefCell::new(mock.clone())));

    let result = send_command(&commands::list(EntityType::User));
    assert_eq!(result, Err(TransportError::NotConnected));
    assert!(mock.sent_messages.borrow().is_empty());
}

#[test]
fn reconnecting_mock_accepts_commands_again() {
    let mut mock = MockWsClient::new(ConnectionState::Disconnected);
    install_client(Rc::new(RefCell::new(mock.clone())));
    mock.connect().unwrap();
    assert_eq!(mock.connection_state(), ConnectionState::Connected);
    assert!(send_command(&commands::get_properties("u1")).is_ok());
    mock.close().unwrap();
    assert!(send_command(&commands::get_properties("u1")).is_err());
}

#[test]
fn incoming_text_is_routed() {
    let msg = message_from_text(r#"{ "command": "DELETE", "id": "u3" }"#);
    assert_eq!(msg, Some(Message::EntityDeleted { id: "u3".into() }));
    assert_eq!(message_from_text("{ not json"), None);
}
