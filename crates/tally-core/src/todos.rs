use serde::{Deserialize, Serialize};

/// Todo identifier: creation time in milliseconds since the Unix epoch.
pub type TodoId = i64;

/// Todo entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    #[serde(alias = "msg")]
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_completed: false,
        }
    }
}

/// Replacement values for every non-id field of a todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub text: String,
    pub is_completed: bool,
}

impl TodoPatch {
    /// Patch that reproduces `todo` as-is; adjust the fields you want to change.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            text: todo.text.clone(),
            is_completed: todo.is_completed,
        }
    }

    fn apply(self, id: TodoId) -> Todo {
        Todo {
            id,
            text: self.text,
            is_completed: self.is_completed,
        }
    }
}

/// Ordered todo list. Insertion order is display order.
///
/// Every operation returns a new list and leaves `self` untouched. Operations
/// addressing an id that is not present return an equal copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TodoList(Vec<Todo>);

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: TodoId, text: impl Into<String>) -> Self {
        let mut todos = self.0.clone();
        todos.push(Todo::new(id, text));
        Self(todos)
    }

    pub fn update(&self, id: TodoId, patch: TodoPatch) -> Self {
        self.map_matching(id, |_| patch.clone().apply(id))
    }

    pub fn delete(&self, id: TodoId) -> Self {
        Self(self.0.iter().filter(|t| t.id != id).cloned().collect())
    }

    pub fn toggle_complete(&self, id: TodoId) -> Self {
        self.map_matching(id, |todo| Todo {
            is_completed: !todo.is_completed,
            ..todo.clone()
        })
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.0.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Todo> {
        self.0.last()
    }

    pub fn max_id(&self) -> Option<TodoId> {
        self.0.iter().map(|t| t.id).max()
    }

    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|t| t.is_completed).count()
    }

    pub fn as_slice(&self) -> &[Todo] {
        &self.0
    }

    fn map_matching(&self, id: TodoId, mut f: impl FnMut(&Todo) -> Todo) -> Self {
        Self(
            self.0
                .iter()
                .map(|t| if t.id == id { f(t) } else { t.clone() })
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Lists of 0..8 todos with distinct ids, arbitrary text and flags.
    fn arb_list() -> impl Strategy<Value = TodoList> {
        prop::collection::vec((any::<String>(), any::<bool>()), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .fold(TodoList::new(), |list, (i, (text, done))| {
                    let id = 1_000 + i as TodoId * 7;
                    let list = list.add(id, text);
                    if done {
                        list.toggle_complete(id)
                    } else {
                        list
                    }
                })
        })
    }

    /// A list plus the id of one of its todos (or an absent id when empty).
    fn arb_list_and_id() -> impl Strategy<Value = (TodoList, TodoId)> {
        arb_list().prop_flat_map(|list| {
            let ids: Vec<TodoId> = list.iter().map(|t| t.id).collect();
            let pick = if ids.is_empty() {
                Just(1).boxed()
            } else {
                prop::sample::select(ids).boxed()
            };
            (Just(list), pick)
        })
    }

    proptest! {
        #[test]
        fn prop_add_appends(list in arb_list(), text in any::<String>()) {
            let id = list.max_id().unwrap_or(0) + 1;
            let next = list.add(id, text.clone());

            prop_assert_eq!(next.len(), list.len() + 1);
            prop_assert_eq!(&next.as_slice()[..list.len()], list.as_slice());
            let last = next.last().expect("last");
            prop_assert_eq!(&last.text, &text);
            prop_assert!(!last.is_completed);
        }

        #[test]
        fn prop_toggle_changes_only_target((list, id) in arb_list_and_id()) {
            let toggled = list.toggle_complete(id);
            prop_assert_eq!(toggled.len(), list.len());
            for (before, after) in list.iter().zip(toggled.iter()) {
                if before.id == id {
                    prop_assert_eq!(after.is_completed, !before.is_completed);
                    prop_assert_eq!(&after.text, &before.text);
                    prop_assert_eq!(after.id, before.id);
                } else {
                    prop_assert_eq!(after, before);
                }
            }
        }

        #[test]
        fn prop_delete_removes_present_id((list, id) in arb_list_and_id()) {
            let removed = list.delete(id);
            if list.contains(id) {
                prop_assert_eq!(removed.len(), list.len() - 1);
            } else {
                prop_assert_eq!(&removed, &list);
            }
            prop_assert!(!removed.contains(id));
        }

        #[test]
        fn prop_delete_missing_id_keeps_list(list in arb_list()) {
            let missing = list.max_id().unwrap_or(0) + 1;
            prop_assert_eq!(list.delete(missing), list);
        }

        #[test]
        fn prop_update_keeps_id_and_other_records(
            (list, id) in arb_list_and_id(),
            text in any::<String>(),
            is_completed in any::<bool>(),
        ) {
            let patch = TodoPatch { text: text.clone(), is_completed };
            let updated = list.update(id, patch);
            prop_assert_eq!(updated.len(), list.len());
            for (before, after) in list.iter().zip(updated.iter()) {
                prop_assert_eq!(after.id, before.id);
                if before.id == id {
                    prop_assert_eq!(&after.text, &text);
                    prop_assert_eq!(after.is_completed, is_completed);
                } else {
                    prop_assert_eq!(after, before);
                }
            }
        }

        #[test]
        fn prop_json_round_trip(list in arb_list()) {
            let json = serde_json::to_vec(&list).expect("serialize");
            let back: TodoList = serde_json::from_slice(&json).expect("deserialize");
            prop_assert_eq!(back, list);
        }
    }

    fn sample() -> TodoList {
        TodoList::new()
            .add(1, "write docs")
            .add(2, "ship")
            .toggle_complete(2)
            .add(3, "celebrate")
    }

    #[test]
    fn add_appends_incomplete_todo() {
        let list = sample();
        let next = list.add(4, "buy milk");

        assert_eq!(next.len(), list.len() + 1);
        let last = next.last().expect("last");
        assert_eq!(last.text, "buy milk");
        assert!(!last.is_completed);
        assert_eq!(list.len(), 3, "receiver must not change");
    }

    #[test]
    fn add_accepts_empty_text() {
        let list = TodoList::new().add(7, "");
        assert_eq!(list.get(7).map(|t| t.text.as_str()), Some(""));
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let list = sample();
        let toggled = list.toggle_complete(1);

        assert!(toggled.get(1).expect("todo 1").is_completed);
        assert_eq!(toggled.get(2), list.get(2));
        assert_eq!(toggled.get(3), list.get(3));

        let back = toggled.toggle_complete(1);
        assert_eq!(back, list);
    }

    #[test]
    fn delete_removes_present_id_and_ignores_missing_id() {
        let list = sample();

        let removed = list.delete(2);
        assert_eq!(removed.len(), list.len() - 1);
        assert!(!removed.contains(2));

        assert_eq!(list.delete(99), list);
    }

    #[test]
    fn update_replaces_non_id_fields_and_keeps_position() {
        let list = sample();
        let updated = list.update(
            1,
            TodoPatch {
                text: "write better docs".into(),
                is_completed: true,
            },
        );

        let first = &updated.as_slice()[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.text, "write better docs");
        assert!(first.is_completed);
        assert_eq!(&updated.as_slice()[1..], &list.as_slice()[1..]);
    }

    #[test]
    fn update_of_missing_id_is_a_no_op() {
        let list = sample();
        let patch = TodoPatch {
            text: "ghost".into(),
            is_completed: true,
        };
        assert_eq!(list.update(42, patch), list);
    }

    #[test]
    fn serializes_as_plain_array_with_camel_case_fields() {
        let list = TodoList::new().add(1700000000000, "buy milk");
        let json = serde_json::to_string(&list).expect("serialize");
        assert_eq!(
            json,
            r#"[{"id":1700000000000,"text":"buy milk","isCompleted":false}]"#
        );

        let back: TodoList = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, list);
    }

    #[test]
    fn accepts_msg_as_text_field() {
        let list: TodoList =
            serde_json::from_str(r#"[{"id":5,"msg":"legacy","isCompleted":true}]"#)
                .expect("deserialize");
        let todo = list.get(5).expect("todo");
        assert_eq!(todo.text, "legacy");
        assert!(todo.is_completed);
    }

    #[test]
    fn buy_milk_scenario() {
        let empty = TodoList::new();
        let added = empty.add(10, "buy milk");
        assert_eq!(added.as_slice(), &[Todo::new(10, "buy milk")]);

        let toggled = added.toggle_complete(10);
        assert_eq!(
            toggled.as_slice(),
            &[Todo {
                id: 10,
                text: "buy milk".into(),
                is_completed: true,
            }]
        );

        assert!(toggled.delete(10).is_empty());
    }
}
