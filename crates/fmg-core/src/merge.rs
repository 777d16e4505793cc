//! Dedup-by-identifier merging for realtime inserts.
//!
//! Realtime insert notifications and polling results can both deliver a row
//! the list already holds. Rows are appended only when their identifier is
//! unseen; no ordering is imposed beyond arrival order.

use std::collections::HashSet;

use crate::entities::{
    DiscussionMessage, Draft, Invoice, Meeting, Milestone, PaymentScheduleRow, Profile, Project,
    ReferenceLink, Revision,
};

/// A row with a stable primary key.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(
    DiscussionMessage,
    Draft,
    Invoice,
    Meeting,
    Milestone,
    PaymentScheduleRow,
    Profile,
    Project,
    ReferenceLink,
    Revision,
);

/// Append every row of `incoming` whose id is not already in `list`.
///
/// Returns how many rows were added. Duplicates within `incoming` are also
/// collapsed to their first occurrence.
pub fn merge_inserts<T: Identified>(list: &mut Vec<T>, incoming: impl IntoIterator<Item = T>) -> usize {
    let mut seen: HashSet<String> = list.iter().map(|row| row.id().to_string()).collect();
    let before = list.len();
    for row in incoming {
        if seen.insert(row.id().to_string()) {
            list.push(row);
        }
    }
    list.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(id: &str, body: &str) -> DiscussionMessage {
        DiscussionMessage {
            id: id.into(),
            project_id: "prj-1".into(),
            author_id: "usr-1".into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unseen_rows_are_appended() {
        let mut list = vec![message("m1", "hello")];
        let added = merge_inserts(&mut list, vec![message("m2", "hi")]);
        assert_eq!(added, 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn seen_rows_are_ignored() {
        let mut list = vec![message("m1", "hello")];
        let added = merge_inserts(&mut list, vec![message("m1", "edited")]);
        assert_eq!(added, 0);
        assert_eq!(list[0].body, "hello");
    }

    #[test]
    fn duplicates_within_batch_collapse() {
        let mut list = Vec::new();
        let added = merge_inserts(
            &mut list,
            vec![message("m1", "a"), message("m1", "b"), message("m2", "c")],
        );
        assert_eq!(added, 2);
        assert_eq!(list[0].body, "a");
    }
}
