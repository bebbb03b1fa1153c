// frontend/src/messages.rs
//
// Everything that can happen in the panel: DOM events, backend responses
// and connection changes.  `update()` turns these into `Command`s.
//
use serde_json::{Map, Value};

use crate::guard::ControlId;
use crate::models::{Entity, EntityType, PropertyTarget, User};
use crate::network::commands::{CommandEnvelope, CommandKind};
use crate::toast::ToastKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Connection lifecycle
    ConnectionOpened,
    ConnectionLost,

    // List / refresh
    RefreshGroups,
    RefreshUsers,
    RefreshGroup(String),                // group_id
    EntitiesListed {
        entity_type: EntityType,
        entities: Vec<Entity>,
    },
    MembersListed {
        group_id: String,
        users: Vec<User>,
    },

    // Create / delete (guarded by the clicked control)
    RequestCreateGroup,
    RequestCreateUser,
    RequestDelete {
        entity: Entity,
    },
    EntityCreated {
        entity: Entity,
        callback: Option<String>,
    },
    EntityDeleted {
        id: String,
    },

    // Associations
    AssignUserToGroup {
        user_id: String,
        group_id: String,
    },
    RemoveUserFromGroup {
        user_id: String,
        group_id: String,
    },
    MemberAdded {
        user_id: String,
        group_id: String,
    },
    MemberRemoved {
        user_id: String,
        group_id: String,
    },

    // Property panel
    EditProperties(PropertyTarget),
    PropertiesLoaded {
        id: String,
        properties: Map<String, Value>,
    },
    UpdateProperty {
        id: String,
        key: String,
        value: String,
    },
    EntityUpdated {
        id: String,
        properties: Map<String, Value>,
    },

    // Backend said no (or the transport did)
    CommandFailed {
        command: CommandKind,
        code: u16,
        message: String,
    },
}

/// Side effects requested by the reducer. Executed after the state borrow
/// has been released (see `state::dispatch_global_message`).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Chain another message to be processed
    SendMessage(Message),

    /// Serialize and hand an envelope to the transport
    Send(CommandEnvelope),

    /// Re-render the top-level groups container from state
    RenderGroups,

    /// Re-render the top-level users container from state
    RenderUsers,

    /// Re-render the nested member list of one group block
    RenderMembers(String),

    /// Re-render (or remove) the property panel
    RenderProperties,

    /// Toggle the `disabled` state of a guarded control in the DOM
    SetControlDisabled { control: ControlId, disabled: bool },

    /// Show a toast
    Notify { kind: ToastKind, text: String },
}
