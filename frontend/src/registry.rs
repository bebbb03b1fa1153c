//! Keyed element registry.
//!
//! Rendered blocks are looked up by entity id through this map instead of
//! re-querying the DOM by class name.  Generic over the handle so the
//! bookkeeping can be tested without a browser.

use std::collections::HashMap;

use crate::guard::ControlId;
use crate::models::EntityType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKey {
    /// Top-level group block
    Group(String),
    /// Top-level user block
    User(String),
    /// User block nested inside a group block
    Member { group_id: String, user_id: String },
    /// Guarded button
    Control(ControlId),
}

impl ElementKey {
    pub fn member(group_id: &str, user_id: &str) -> Self {
        ElementKey::Member {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Keys owned by the groups container: group blocks, their nested
    /// members and the group controls.
    pub fn in_groups_container(&self) -> bool {
        match self {
            ElementKey::Group(_) | ElementKey::Member { .. } => true,
            ElementKey::Control(ControlId::AddGroup) => true,
            ElementKey::Control(ControlId::Delete(r)) => r.entity_type == EntityType::Group,
            _ => false,
        }
    }

    /// Keys owned by the top-level users container.
    pub fn in_users_container(&self) -> bool {
        match self {
            ElementKey::User(_) => true,
            ElementKey::Control(ControlId::AddUser) => true,
            ElementKey::Control(ControlId::Delete(r)) => r.entity_type == EntityType::User,
            _ => false,
        }
    }
}

pub struct ElementRegistry<H> {
    entries: HashMap<ElementKey, H>,
}

impl<H> Default for ElementRegistry<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> ElementRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle`, returning the one previously stored under `key`.
    pub fn insert(&mut self, key: ElementKey, handle: H) -> Option<H> {
        self.entries.insert(key, handle)
    }

    pub fn get(&self, key: &ElementKey) -> Option<&H> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ElementKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry matching `pred` and hand the removed handles back.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<H>
    where
        F: FnMut(&ElementKey) -> bool,
    {
        let keys: Vec<ElementKey> = self.entries.keys().filter(|k| pred(k)).cloned().collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .collect()
    }

    /// Forget all member entries of one group.
    pub fn remove_members_of(&mut self, group: &str) -> Vec<H> {
        self.remove_where(|k| matches!(k, ElementKey::Member { group_id, .. } if group_id == group))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
