/// State differ for comparing decoded application states
use crate::types::*;

/// Diff engine for comparing two decoded states
pub struct StateDiffer;

impl StateDiffer {
    /// Compute the diff from `before` to `after`.
    ///
    /// Added and modified entries follow the order of `after`, removed entries
    /// the order of `before`.
    pub fn diff(before: &DecodedState, after: &DecodedState) -> StateDiff {
        let mut diff = StateDiff::default();

        for (key, after_value) in after.iter() {
            match before.get_key(key) {
                Some(before_value) if before_value == after_value => diff.unchanged += 1,
                Some(before_value) => diff.modified.push(ModifiedEntry {
                    key: key.to_string(),
                    before: before_value.clone(),
                    after: after_value.clone(),
                }),
                None => {
                    diff.added.insert(key.clone(), after_value.clone());
                }
            }
        }

        for (key, before_value) in before.iter() {
            if !after.contains_key(key) {
                diff.removed.insert(key.clone(), before_value.clone());
            }
        }

        diff
    }

    /// Format diff in human-readable format
    pub fn format_human(diff: &StateDiff) -> String {
        let mut output = String::new();

        if !diff.added.is_empty() {
            output.push_str("+ ADDED\n");
            for (key, value) in diff.added.iter() {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
            output.push('\n');
        }

        if !diff.removed.is_empty() {
            output.push_str("- REMOVED\n");
            for (key, value) in diff.removed.iter() {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
            output.push('\n');
        }

        if !diff.modified.is_empty() {
            output.push_str("~ CHANGED\n");
            for entry in &diff.modified {
                output.push_str(&format!("  {}\n", entry.key));
                output.push_str(&format!("    before: {}\n", entry.before));
                output.push_str(&format!("    after:  {}\n", entry.after));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "{} changed, {} added, {} removed, {} unchanged",
            diff.modified.len(),
            diff.added.len(),
            diff.removed.len(),
            diff.unchanged
        ));

        output
    }
}
