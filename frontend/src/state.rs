use std::cell::RefCell;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};

use crate::guard::ControlGuard;
use crate::messages::{Command, Message};
use crate::models::{Group, PropertyTarget, User};
use crate::update::update;

/// The open property panel: what it is for and, once the backend has
/// answered, the loaded properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPanel {
    pub target: PropertyTarget,
    pub properties: Option<Map<String, Value>>,
}

// Store global application state
pub struct AdminState {
    // Top-level lists in backend order
    pub groups: Vec<Group>,
    pub users: Vec<User>,
    // group_id -> users assigned to that group
    pub members: HashMap<String, Vec<User>>,
    // Whether a LIST response has been applied since the last refresh
    pub groups_listed: bool,
    pub users_listed: bool,
    // Controls waiting on their command
    pub guard: ControlGuard,
    pub property_panel: Option<PropertyPanel>,
    pub connected: bool,
    // Source for placeholder names
    pub rng: StdRng,
}

impl AdminState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic placeholder names, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            groups: Vec::new(),
            users: Vec::new(),
            members: HashMap::new(),
            groups_listed: false,
            users_listed: false,
            guard: ControlGuard::new(),
            property_panel: None,
            connected: false,
            rng,
        }
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn members_of(&self, group_id: &str) -> &[User] {
        self.members.get(group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run the reducer and hand back the side effects it requested.
    pub fn dispatch(&mut self, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(self, msg, &mut commands);
        commands
    }
}

impl Default for AdminState {
    fn default() -> Self {
        Self::new()
    }
}

// We use thread_local to store our app state
thread_local! {
    pub static APP_STATE: RefCell<AdminState> = RefCell::new(AdminState::new());
}

/// Update the global state with `msg`, then execute the resulting commands
/// once the mutable borrow has been dropped.
pub fn dispatch_global_message(msg: Message) {
    let commands = APP_STATE.with(|state_ref| {
        let mut state = mut_borrow!(state_ref);
        state.dispatch(msg)
    });
    crate::command_executors::execute_commands(commands);
}
