//! Per-card actions, keyed as `"<action>:<id>"`.

use comicmaker_types::EntityId;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Edit,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
        }
    }
}

/// An action bound to one rendered entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageAction {
    pub kind: ActionKind,
    pub id: EntityId,
}

impl PageAction {
    pub fn edit(id: impl Into<EntityId>) -> Self {
        Self {
            kind: ActionKind::Edit,
            id: id.into(),
        }
    }

    pub fn delete(id: impl Into<EntityId>) -> Self {
        Self {
            kind: ActionKind::Delete,
            id: id.into(),
        }
    }

    /// Dispatch key a UI adapter registers for this action.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("Malformed action key '{0}', expected '<action>:<id>'")]
    Malformed(String),
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

impl FromStr for PageAction {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, id) = s
            .split_once(':')
            .filter(|(_, id)| !id.is_empty())
            .ok_or_else(|| ActionParseError::Malformed(s.to_string()))?;
        let kind = match action {
            "edit" => ActionKind::Edit,
            "delete" => ActionKind::Delete,
            other => return Err(ActionParseError::UnknownAction(other.to_string())),
        };
        Ok(Self {
            kind,
            id: EntityId::from(id),
        })
    }
}
