use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{RecordId, TableRecord};

use super::TableState;

/// View policy allowing at most one row in edit mode.
///
/// The controller itself accepts any number of editing rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleRowEditPolicy;

impl SingleRowEditPolicy {
    /// Rejects entering edit mode on `candidate` while another row is mid-edit.
    pub fn check<R: TableRecord>(
        &self,
        state: &TableState<R>,
        candidate: &RecordId,
    ) -> AppResult<()> {
        match state.editing().find(|id| *id != candidate) {
            Some(other) => Err(AppError::Conflict(format!(
                "finish editing row '{other}' first"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_domain::{Employee, RecordId};

    use super::{SingleRowEditPolicy, TableState};

    #[test]
    fn idle_table_allows_editing() {
        let state = TableState::<Employee>::default();
        assert!(SingleRowEditPolicy.check(&state, &RecordId::saved("1")).is_ok());
    }

    #[test]
    fn second_row_is_rejected_while_one_is_mid_edit() {
        let mut state = TableState::<Employee>::default();
        state.replace_rows(vec![
            Employee::new(RecordId::saved("1"), "Ada"),
            Employee::new(RecordId::saved("2"), "Grace"),
        ]);
        state.editing.insert(RecordId::saved("1"));

        assert!(SingleRowEditPolicy.check(&state, &RecordId::saved("1")).is_ok());
        assert!(SingleRowEditPolicy.check(&state, &RecordId::saved("2")).is_err());
        assert!(SingleRowEditPolicy.check(&state, &RecordId::Draft).is_err());
    }
}
