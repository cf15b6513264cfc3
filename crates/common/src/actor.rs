use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A principal that can be credited with an activity.
///
/// Supplied by the host's user/session system. Implementors only need to
/// expose a display name and, for known principals, a stable identifier.
pub trait Actor {
    /// Display name shown in reports.
    fn name(&self) -> &str;

    /// Stable identifier; `None` for anonymous or non-player actors.
    fn unique_id(&self) -> Option<Uuid>;
}

/// Plain owned actor, used by the CLI and tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl Principal {
    pub fn player(name: impl Into<String>, id: Uuid) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

impl Actor for Principal {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_id(&self) -> Option<Uuid> {
        self.id
    }
}

impl<A: Actor + ?Sized> Actor for &A {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn unique_id(&self) -> Option<Uuid> {
        (**self).unique_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_kinds() {
        let id = Uuid::new_v4();
        let player = Principal::player("Notch", id);
        assert_eq!(player.name(), "Notch");
        assert_eq!(player.unique_id(), Some(id));

        let console = Principal::other("Console");
        assert_eq!(console.unique_id(), None);
    }

    #[test]
    fn actor_through_reference() {
        fn name_of(actor: impl Actor) -> String {
            actor.name().to_string()
        }
        let console = Principal::other("Console");
        assert_eq!(name_of(&console), "Console");
    }
}
