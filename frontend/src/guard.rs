//! In-flight command guard.
//!
//! A control that issues a command stays disabled until that command
//! resolves, so repeated clicks cannot submit duplicates.  Different controls
//! do not block each other; each one is released by its own confirmation.

use crate::models::EntityRef;
use crate::network::commands::CommandKind;

/// Guarded controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlId {
    AddGroup,
    AddUser,
    Delete(EntityRef),
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlId::AddGroup => write!(f, "add-group"),
            ControlId::AddUser => write!(f, "add-user"),
            ControlId::Delete(r) => write!(f, "delete-{}-{}", r.entity_type, r.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Pending {
    control: ControlId,
    command: CommandKind,
}

/// Result of [`ControlGuard::try_arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// The control was idle and is now disabled.
    Armed,
    /// The control is already waiting on a command; do nothing.
    Rejected,
}

#[derive(Debug, Default, Clone)]
pub struct ControlGuard {
    // Oldest first
    pending: Vec<Pending>,
}

impl ControlGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self, control: &ControlId) -> bool {
        self.pending.iter().any(|p| &p.control == control)
    }

    /// True when no control waits on a command.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_controls(&self) -> impl Iterator<Item = &ControlId> {
        self.pending.iter().map(|p| &p.control)
    }

    pub fn try_arm(&mut self, control: ControlId, command: CommandKind) -> ArmOutcome {
        if self.is_disabled(&control) {
            return ArmOutcome::Rejected;
        }
        self.pending.push(Pending { control, command });
        ArmOutcome::Armed
    }

    /// Release `control` if it is waiting.
    pub fn resolve_control(&mut self, control: &ControlId) -> Option<ControlId> {
        self.take_first(|p| &p.control == control)
    }

    /// Release the delete control waiting on the entity `id`.
    pub fn resolve_delete(&mut self, id: &str) -> Option<ControlId> {
        self.take_first(|p| matches!(&p.control, ControlId::Delete(r) if r.id == id))
    }

    /// Release the oldest control waiting on a command of kind `command`.
    pub fn resolve_kind(&mut self, command: CommandKind) -> Option<ControlId> {
        self.take_first(|p| p.command == command)
    }

    /// Release everything, oldest first.
    pub fn release_all(&mut self) -> Vec<ControlId> {
        self.pending.drain(..).map(|p| p.control).collect()
    }

    fn take_first<F>(&mut self, pred: F) -> Option<ControlId>
    where
        F: Fn(&Pending) -> bool,
    {
        let index = self.pending.iter().position(pred)?;
        Some(self.pending.remove(index).control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    fn delete_of(id: &str, entity_type: EntityType) -> ControlId {
        ControlId::Delete(EntityRef::new(id, entity_type))
    }

    #[test]
    fn second_arm_on_same_control_is_rejected() {
        let mut guard = ControlGuard::new();
        assert_eq!(guard.try_arm(ControlId::AddGroup, CommandKind::Create), ArmOutcome::Armed);
        assert!(guard.is_disabled(&ControlId::AddGroup));
        assert_eq!(guard.try_arm(ControlId::AddGroup, CommandKind::Create), ArmOutcome::Rejected);
    }

    #[test]
    fn other_control_does_not_release_first() {
        let mut guard = ControlGuard::new();
        guard.try_arm(ControlId::AddGroup, CommandKind::Create);
        assert_eq!(guard.try_arm(ControlId::AddUser, CommandKind::Create), ArmOutcome::Armed);
        assert!(guard.is_disabled(&ControlId::AddGroup));
        assert!(guard.is_disabled(&ControlId::AddUser));

        // Clicking the first control again while its command is out
        assert_eq!(guard.try_arm(ControlId::AddGroup, CommandKind::Create), ArmOutcome::Rejected);
    }

    #[test]
    fn delete_resolves_only_its_own_entity() {
        let mut guard = ControlGuard::new();
        let g1 = delete_of("g1", EntityType::Group);
        let u1 = delete_of("u1", EntityType::User);
        guard.try_arm(g1.clone(), CommandKind::Delete);
        guard.try_arm(u1.clone(), CommandKind::Delete);

        assert_eq!(guard.resolve_delete("zzz"), None);
        assert!(guard.is_disabled(&g1));

        assert_eq!(guard.resolve_delete("u1"), Some(u1.clone()));
        assert!(!guard.is_disabled(&u1));
        assert!(guard.is_disabled(&g1));
    }

    #[test]
    fn resolve_control_leaves_others_pending() {
        let mut guard = ControlGuard::new();
        guard.try_arm(ControlId::AddGroup, CommandKind::Create);
        guard.try_arm(ControlId::AddUser, CommandKind::Create);

        assert_eq!(guard.resolve_control(&ControlId::AddUser), Some(ControlId::AddUser));
        assert_eq!(guard.resolve_control(&ControlId::AddUser), None);
        assert_eq!(guard.pending_controls().collect::<Vec<_>>(), vec![&ControlId::AddGroup]);
    }

    #[test]
    fn resolve_kind_takes_oldest_match() {
        let mut guard = ControlGuard::new();
        let g1 = delete_of("g1", EntityType::Group);
        guard.try_arm(g1.clone(), CommandKind::Delete);
        guard.try_arm(ControlId::AddUser, CommandKind::Create);
        guard.try_arm(ControlId::AddGroup, CommandKind::Create);

        assert_eq!(guard.resolve_kind(CommandKind::Add), None);
        assert_eq!(guard.resolve_kind(CommandKind::Create), Some(ControlId::AddUser));
        assert_eq!(guard.resolve_kind(CommandKind::Delete), Some(g1));
        assert!(guard.is_disabled(&ControlId::AddGroup));
    }

    #[test]
    fn release_all_clears_every_control() {
        let mut guard = ControlGuard::new();
        assert!(guard.release_all().is_empty());
        guard.try_arm(ControlId::AddUser, CommandKind::Create);
        guard.try_arm(ControlId::AddGroup, CommandKind::Create);
        assert_eq!(guard.release_all(), vec![ControlId::AddUser, ControlId::AddGroup]);
        assert!(guard.is_idle());
        assert_eq!(guard.try_arm(ControlId::AddUser, CommandKind::Create), ArmOutcome::Armed);
    }

    #[test]
    fn control_ids_render_stable_dom_ids() {
        assert_eq!(ControlId::AddGroup.to_string(), "add-group");
        assert_eq!(delete_of("u9", EntityType::User).to_string(), "delete-User-u9");
    }
}
