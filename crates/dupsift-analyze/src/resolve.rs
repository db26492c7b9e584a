//! Turning confirmed groups into actions.

use dupsift_core::{Action, FileRecord, partition_by};

use crate::config::TieBreak;

/// Keep one member of each group of identical files and remove the rest.
pub fn resolve_duplicates(groups: Vec<Vec<FileRecord>>, tie_break: TieBreak) -> Vec<Action> {
    let mut actions = Vec::with_capacity(groups.iter().map(Vec::len).sum());

    for mut group in groups {
        tie_break.arrange(&mut group, FileRecord::path);
        let mut members = group.into_iter();
        actions.extend(members.next().map(Action::Keep));
        actions.extend(members.map(Action::Remove));
    }

    actions
}

/// Relabel kept files that share a filename so that only one of them keeps
/// its name.
///
/// Non-`Keep` actions pass through first, then kept files with unique names,
/// then each name group with its survivor leading.
pub fn disambiguate_names(actions: Vec<Action>, tie_break: TieBreak) -> Vec<Action> {
    let total = actions.len();
    let (keeps, others): (Vec<Action>, Vec<Action>) =
        actions.into_iter().partition(Action::is_keep);

    let by_name = partition_by(keeps.into_iter().map(Action::into_record), |record| {
        record.filename().to_string()
    });

    let mut result = Vec::with_capacity(total);
    result.extend(others);
    result.extend(by_name.resolved.into_iter().map(Action::Keep));

    for (name, mut group) in by_name.deferred {
        tracing::trace!(filename = %name, count = group.len(), "filename collision");
        tie_break.arrange(&mut group, FileRecord::path);
        let mut members = group.into_iter();
        result.extend(members.next().map(Action::Keep));
        result.extend(members.map(Action::KeepWithRename));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupsift_core::ActionKind;

    fn rec(name: &str, dir: &str, size: u64) -> FileRecord {
        FileRecord::new(name, format!("/{dir}/{name}"), size)
    }

    fn kinds(actions: &[Action]) -> Vec<ActionKind> {
        actions.iter().map(Action::kind).collect()
    }

    #[test]
    fn test_first_member_survives() {
        let groups = vec![vec![rec("a.jpg", "2", 5), rec("b.jpg", "1", 5), rec("c.jpg", "3", 5)]];

        let actions = resolve_duplicates(groups, TieBreak::Discovery);

        assert_eq!(
            kinds(&actions),
            vec![ActionKind::Keep, ActionKind::Remove, ActionKind::Remove]
        );
        assert_eq!(actions[0].record().filename(), "a.jpg");
    }

    #[test]
    fn test_path_tie_break() {
        let groups = vec![vec![rec("a.jpg", "2", 5), rec("b.jpg", "1", 5)]];

        let actions = resolve_duplicates(groups, TieBreak::Path);

        assert!(actions[0].is_keep());
        assert_eq!(actions[0].record().filename(), "b.jpg");
    }

    #[test]
    fn test_disambiguate_preserves_count_and_order() {
        let actions = vec![
            Action::Keep(rec("x.jpg", "1", 1)),
            Action::Remove(rec("r.jpg", "1", 2)),
            Action::Keep(rec("solo.jpg", "1", 3)),
            Action::Keep(rec("x.jpg", "2", 4)),
            Action::Keep(rec("x.jpg", "3", 5)),
        ];

        let result = disambiguate_names(actions, TieBreak::Discovery);

        assert_eq!(result.len(), 5);
        assert_eq!(
            kinds(&result),
            vec![
                ActionKind::Remove,
                ActionKind::Keep,
                ActionKind::Keep,
                ActionKind::KeepWithRename,
                ActionKind::KeepWithRename,
            ]
        );
        assert_eq!(result[1].record().filename(), "solo.jpg");
        assert_eq!(result[2].record().size(), 1);
    }

    #[test]
    fn test_removed_files_do_not_collide() {
        let actions = vec![
            Action::Keep(rec("x.jpg", "1", 1)),
            Action::Remove(rec("x.jpg", "2", 1)),
        ];

        let result = disambiguate_names(actions, TieBreak::Discovery);

        assert_eq!(kinds(&result), vec![ActionKind::Remove, ActionKind::Keep]);
    }
}
