use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolution tag for one row. Absence of a tag means unresolved.
///
/// Only `Delete` and `Reject` change what is committed; the other tags are
/// kept as annotations for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RowAction {
    #[serde(rename = "U")]
    Update,
    #[serde(rename = "A")]
    Accept,
    #[serde(rename = "DI")]
    DeleteAndInsert,
    #[serde(rename = "D")]
    Delete,
    #[serde(rename = "R")]
    Reject,
    #[serde(rename = "H")]
    Hold,
}

impl RowAction {
    pub const ALL: [RowAction; 6] = [
        RowAction::Update,
        RowAction::Accept,
        RowAction::DeleteAndInsert,
        RowAction::Delete,
        RowAction::Reject,
        RowAction::Hold,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Update => "U",
            Self::Accept => "A",
            Self::DeleteAndInsert => "DI",
            Self::Delete => "D",
            Self::Reject => "R",
            Self::Hold => "H",
        }
    }

    /// Rows with these tags leave duplicate groups and are dropped at commit.
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Delete | Self::Reject)
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown row action '{}' (expected U, A, DI, D, R or H)", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for RowAction {
    type Err = ParseActionError;

    /// Accepts the compact codes and the full names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "update" => Ok(Self::Update),
            "a" | "accept" => Ok(Self::Accept),
            "di" | "delete_and_insert" | "deleteandinsert" => Ok(Self::DeleteAndInsert),
            "d" | "delete" => Ok(Self::Delete),
            "r" | "reject" => Ok(Self::Reject),
            "h" | "hold" => Ok(Self::Hold),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// Row action map keyed by original index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowActions {
    actions: BTreeMap<usize, RowAction>,
}

impl RowActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, idx: usize) -> Option<RowAction> {
        self.actions.get(&idx).copied()
    }

    /// Tag a row, overwriting any earlier tag. Returns the previous tag.
    pub fn set(&mut self, idx: usize, action: RowAction) -> Option<RowAction> {
        self.actions.insert(idx, action)
    }

    /// Return a row to unresolved.
    pub fn clear(&mut self, idx: usize) -> Option<RowAction> {
        self.actions.remove(&idx)
    }

    pub fn is_removed(&self, idx: usize) -> bool {
        self.get(idx).is_some_and(|a| a.is_removal())
    }

    /// Apply an action to every member of a group, in stored order.
    ///
    /// `DeleteAndInsert` keeps the first member as the surviving row and
    /// marks the rest `Delete`.
    pub fn apply_to_group(&mut self, members: &[usize], action: RowAction) {
        for (i, &idx) in members.iter().enumerate() {
            let tag = match action {
                RowAction::DeleteAndInsert if i > 0 => RowAction::Delete,
                other => other,
            };
            self.actions.insert(idx, tag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, RowAction)> + '_ {
        self.actions.iter().map(|(&idx, &a)| (idx, a))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn removed_count(&self) -> usize {
        self.actions.values().filter(|a| a.is_removal()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for action in RowAction::ALL {
            assert_eq!(action.code().parse::<RowAction>().unwrap(), action);
        }
        assert_eq!("delete_and_insert".parse::<RowAction>().unwrap(), RowAction::DeleteAndInsert);
        assert_eq!(" hold ".parse::<RowAction>().unwrap(), RowAction::Hold);
        assert!("X".parse::<RowAction>().is_err());
    }

    #[test]
    fn only_delete_and_reject_remove() {
        let removing: Vec<_> = RowAction::ALL.iter().filter(|a| a.is_removal()).collect();
        assert_eq!(removing, vec![&RowAction::Delete, &RowAction::Reject]);
    }

    #[test]
    fn single_row_overwrites_any_state() {
        let mut actions = RowActions::new();
        assert_eq!(actions.set(3, RowAction::Delete), None);
        assert!(actions.is_removed(3));
        assert_eq!(actions.set(3, RowAction::Hold), Some(RowAction::Delete));
        assert!(!actions.is_removed(3));
        assert_eq!(actions.clear(3), Some(RowAction::Hold));
        assert_eq!(actions.get(3), None);
    }

    #[test]
    fn group_delete_and_insert_keeps_first() {
        let mut actions = RowActions::new();
        actions.apply_to_group(&[4, 2, 9], RowAction::DeleteAndInsert);
        assert_eq!(actions.get(4), Some(RowAction::DeleteAndInsert));
        assert_eq!(actions.get(2), Some(RowAction::Delete));
        assert_eq!(actions.get(9), Some(RowAction::Delete));
        assert_eq!(actions.removed_count(), 2);
    }

    #[test]
    fn group_other_actions_apply_uniformly() {
        for action in RowAction::ALL {
            if action == RowAction::DeleteAndInsert {
                continue;
            }
            let mut actions = RowActions::new();
            actions.apply_to_group(&[1, 5], action);
            assert_eq!(actions.get(1), Some(action));
            assert_eq!(actions.get(5), Some(action));
        }
    }

    #[test]
    fn serializes_as_codes() {
        let mut actions = RowActions::new();
        actions.set(1, RowAction::DeleteAndInsert);
        actions.set(2, RowAction::Reject);
        let json = serde_json::to_string(&actions).unwrap();
        assert_eq!(json, r#"{"1":"DI","2":"R"}"#);
        let back: RowActions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, actions);
    }
}
