//! Resolution plans: a TOML list of edits, row actions and group actions
//! replayed against an editor session.
//!
//! ```toml
//! [[edit]]
//! row = 2
//! col = 1
//! value = "Pending"
//!
//! [[row]]
//! index = 3
//! action = "R"
//!
//! [[group]]
//! key = "PO100"
//! action = "DI"
//! ```
//!
//! Steps run in that order: edits, then row actions, then group actions.
//! Group keys are resolved after the earlier steps, so an edit that changes
//! a key or a row rejected by index reshapes the groups the plan sees.

use std::fmt;

use serde::Deserialize;

use auditgrid_core::CellValue;
use auditgrid_recon::{EditorSession, RowAction, SessionError};

#[derive(Debug)]
pub enum PlanError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Structurally valid TOML with an unusable step.
    Validation(String),
    /// A `[[group]]` key that names no current duplicate group.
    UnknownGroup(String),
    /// The session refused a step.
    Session(SessionError),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "plan parse error: {msg}"),
            Self::Validation(msg) => write!(f, "plan validation error: {msg}"),
            Self::UnknownGroup(key) => write!(f, "no duplicate group with key '{key}'"),
            Self::Session(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Session(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SessionError> for PlanError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlan {
    #[serde(default)]
    edit: Vec<EditStep>,
    #[serde(default)]
    row: Vec<RawRowStep>,
    #[serde(default)]
    group: Vec<RawGroupStep>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRowStep {
    index: usize,
    action: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroupStep {
    key: String,
    action: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditStep {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStep {
    pub index: usize,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStep {
    pub key: String,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolutionPlan {
    pub edits: Vec<EditStep>,
    pub rows: Vec<RowStep>,
    pub groups: Vec<GroupStep>,
}

/// What a plan did to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanReport {
    pub edits: usize,
    pub row_actions: usize,
    pub group_actions: usize,
}

impl ResolutionPlan {
    pub fn from_toml(input: &str) -> Result<Self, PlanError> {
        let raw: RawPlan = toml::from_str(input).map_err(|e| PlanError::Parse(e.to_string()))?;

        for (i, edit) in raw.edit.iter().enumerate() {
            if edit.row == 0 {
                return Err(PlanError::Validation(format!(
                    "edit #{}: row 0 is the header",
                    i + 1
                )));
            }
        }

        let rows = raw
            .row
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                if step.index == 0 {
                    return Err(PlanError::Validation(format!(
                        "row #{}: index 0 is the header",
                        i + 1
                    )));
                }
                let action = parse_action(&step.action, || format!("row #{}", i + 1))?;
                Ok(RowStep { index: step.index, action })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let groups = raw
            .group
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                let key = step.key.trim().to_string();
                if key.is_empty() {
                    return Err(PlanError::Validation(format!("group #{}: empty key", i + 1)));
                }
                let action = parse_action(&step.action, || format!("group #{}", i + 1))?;
                Ok(GroupStep { key, action })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { edits: raw.edit, rows, groups })
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.rows.is_empty() && self.groups.is_empty()
    }

    /// Replay the plan. Stops at the first failing step; steps already
    /// applied stay applied (and undoable) in the session.
    pub fn apply(&self, session: &mut EditorSession) -> Result<PlanReport, PlanError> {
        let mut report = PlanReport::default();

        for edit in &self.edits {
            session.edit_cell(edit.row, edit.col, edit.value.clone())?;
            report.edits += 1;
        }
        for step in &self.rows {
            session.apply_row_action(step.index, step.action)?;
            report.row_actions += 1;
        }
        for step in &self.groups {
            if !session.focus_group(&step.key) {
                return Err(PlanError::UnknownGroup(step.key.clone()));
            }
            session.apply_group_action(step.action)?;
            report.group_actions += 1;
        }

        Ok(report)
    }
}

fn parse_action(code: &str, at: impl FnOnce() -> String) -> Result<RowAction, PlanError> {
    code.parse()
        .map_err(|e| PlanError::Validation(format!("{}: {e}", at())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditgrid_config::EditorSettings;
    use auditgrid_engine::{ColumnLayout, InputBus, Table};

    const PLAN: &str = r#"
[[edit]]
row = 3
col = 1
value = "Pending"

[[row]]
index = 4
action = "hold"

[[group]]
key = "PO100"
action = "DI"
"#;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn session(bus: &InputBus) -> EditorSession {
        let matrix = vec![
            vec![t("PO"), t("Status")],
            vec![t("PO100"), t("Open")],
            vec![t("PO100"), t("Open")],
            vec![t("PO200"), t("Open")],
            vec![t("PO300"), t("Open")],
        ];
        let table = Table::from_matrix(matrix, ColumnLayout::default()).unwrap();
        EditorSession::open(table, 0, &EditorSettings::default(), bus).unwrap()
    }

    #[test]
    fn parse_all_step_kinds() {
        let plan = ResolutionPlan::from_toml(PLAN).unwrap();
        assert_eq!(
            plan.edits,
            vec![EditStep { row: 3, col: 1, value: t("Pending") }]
        );
        assert_eq!(plan.rows, vec![RowStep { index: 4, action: RowAction::Hold }]);
        assert_eq!(
            plan.groups,
            vec![GroupStep { key: "PO100".into(), action: RowAction::DeleteAndInsert }]
        );
    }

    #[test]
    fn numeric_edit_values() {
        let plan = ResolutionPlan::from_toml("[[edit]]\nrow = 1\ncol = 2\nvalue = 12\n").unwrap();
        assert_eq!(plan.edits[0].value, CellValue::Number(12.0));
    }

    #[test]
    fn empty_plan_is_valid() {
        assert!(ResolutionPlan::from_toml("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_steps() {
        let cases = [
            "[[row]]\nindex = 0\naction = \"A\"\n",
            "[[row]]\nindex = 1\naction = \"X\"\n",
            "[[group]]\nkey = \"  \"\naction = \"A\"\n",
            "[[edit]]\nrow = 0\ncol = 0\nvalue = \"x\"\n",
        ];
        for input in cases {
            assert!(
                matches!(ResolutionPlan::from_toml(input), Err(PlanError::Validation(_))),
                "{input}"
            );
        }
        assert!(matches!(
            ResolutionPlan::from_toml("[[row]]\nindex = 1\naction = \"A\"\nextra = 1\n"),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn apply_runs_steps_in_order() {
        let bus = InputBus::new();
        let mut s = session(&bus);
        let plan = ResolutionPlan::from_toml(PLAN).unwrap();
        let report = plan.apply(&mut s).unwrap();

        assert_eq!(report, PlanReport { edits: 1, row_actions: 1, group_actions: 1 });
        assert_eq!(s.table().cell(3, 1), Some(&t("Pending")));
        assert_eq!(s.actions().get(1), Some(RowAction::DeleteAndInsert));
        assert_eq!(s.actions().get(2), Some(RowAction::Delete));
        assert_eq!(s.actions().get(4), Some(RowAction::Hold));

        let out = s.commit();
        assert_eq!(out.summary.total_data_rows, 3);
    }

    #[test]
    fn unknown_group_stops_the_plan() {
        let bus = InputBus::new();
        let mut s = session(&bus);
        let plan = ResolutionPlan::from_toml("[[group]]\nkey = \"PO200\"\naction = \"A\"\n").unwrap();
        let err = plan.apply(&mut s).unwrap_err();
        assert!(matches!(err, PlanError::UnknownGroup(ref k) if k == "PO200"));
    }

    #[test]
    fn row_out_of_range_is_a_session_error() {
        let bus = InputBus::new();
        let mut s = session(&bus);
        let plan = ResolutionPlan::from_toml("[[row]]\nindex = 9\naction = \"R\"\n").unwrap();
        assert!(matches!(
            plan.apply(&mut s),
            Err(PlanError::Session(SessionError::NotADataRow(9)))
        ));
    }
}
