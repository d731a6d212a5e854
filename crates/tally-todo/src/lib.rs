use std::sync::Arc;

use anyhow::{Context, Result};
use tally_core::{
    storage::{SlotError, SlotStore},
    todos::{Todo, TodoId, TodoList, TodoPatch},
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, instrument, warn};

/// Slot key used when the caller has no preference.
pub const DEFAULT_SLOT_KEY: &str = "todos";

/// How the startup load of the persisted slot went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing stored: missing slot, blank value, `null` or an empty array.
    Empty,
    /// A non-empty list was restored.
    Loaded { count: usize },
    /// The stored value was malformed and has been replaced by an empty list.
    Discarded { reason: String },
}

/// Result of a mutation addressing an existing todo by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The list changed; carries the updated record (or the removed one).
    Applied(Todo),
    /// The list value did not change: unknown id, or a patch equal to the record.
    Unchanged,
}

impl Change {
    pub fn is_applied(&self) -> bool {
        matches!(self, Change::Applied(_))
    }
}

/// Todo list held in memory and mirrored in full to one slot of a `SlotStore`.
///
/// Mutations are serialized: each one computes the next list, persists it and
/// publishes it before the next mutation starts. Consumers either re-query
/// with [`TodoStore::list`] or watch [`TodoStore::subscribe`].
pub struct TodoStore<S: SlotStore> {
    store: Arc<S>,
    key: String,
    current: Mutex<TodoList>,
    changes: watch::Sender<TodoList>,
    load_state: LoadState,
}

impl<S: SlotStore> TodoStore<S> {
    /// Load the list persisted under `key`; missing or malformed data yields an empty list.
    #[instrument(skip_all)]
    pub async fn open(store: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let (list, load_state) = load(&store, &key).await?;
        debug!(key = %key, ?load_state, "todo store opened");

        let (changes, _) = watch::channel(list.clone());
        Ok(Self {
            store: Arc::new(store),
            key,
            current: Mutex::new(list),
            changes,
            load_state,
        })
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Snapshot of the current list.
    pub fn list(&self) -> TodoList {
        self.changes.borrow().clone()
    }

    /// Receiver that is marked changed after every applied mutation.
    pub fn subscribe(&self) -> watch::Receiver<TodoList> {
        self.changes.subscribe()
    }

    /// Append a new incomplete todo stamped with the current time.
    #[instrument(skip(self, text))]
    pub async fn add(&self, text: impl Into<String>) -> Result<Todo> {
        let text = text.into();
        let mut current = self.current.lock().await;
        let id = next_id(&current, chrono::Utc::now().timestamp_millis());
        let next = current.add(id, text);
        let todo = next
            .last()
            .cloned()
            .context("freshly added todo missing from list")?;
        self.commit(&mut current, next).await?;
        Ok(todo)
    }

    /// Replace every non-id field of the todo `id` with the values from `patch`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Change> {
        let mut current = self.current.lock().await;
        let next = current.update(id, patch);
        let change = match next.get(id) {
            Some(todo) if current.get(id) != Some(todo) => Change::Applied(todo.clone()),
            _ => Change::Unchanged,
        };
        if change.is_applied() {
            self.commit(&mut current, next).await?;
        }
        Ok(change)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: TodoId) -> Result<Change> {
        let mut current = self.current.lock().await;
        let Some(removed) = current.get(id).cloned() else {
            return Ok(Change::Unchanged);
        };
        let next = current.delete(id);
        self.commit(&mut current, next).await?;
        Ok(Change::Applied(removed))
    }

    #[instrument(skip(self))]
    pub async fn toggle_complete(&self, id: TodoId) -> Result<Change> {
        let mut current = self.current.lock().await;
        if !current.contains(id) {
            return Ok(Change::Unchanged);
        }
        let next = current.toggle_complete(id);
        let toggled = next
            .get(id)
            .cloned()
            .context("toggled todo missing from list")?;
        self.commit(&mut current, next).await?;
        Ok(Change::Applied(toggled))
    }

    /// Persist `next`, then make it the current list and notify subscribers.
    /// On a failed save the current list is left as it was.
    async fn commit(&self, current: &mut TodoList, next: TodoList) -> Result<()> {
        let bytes = serde_json::to_vec(&next)?;
        self.store
            .put(&self.key, &bytes)
            .await
            .with_context(|| format!("saving todos to slot `{}`", self.key))?;
        *current = next.clone();
        self.changes.send_replace(next);
        Ok(())
    }
}

async fn load<S: SlotStore>(store: &S, key: &str) -> Result<(TodoList, LoadState)> {
    let bytes = match store.get(key).await {
        Ok(bytes) => bytes,
        Err(SlotError::NotFound { .. }) => return Ok((TodoList::new(), LoadState::Empty)),
        Err(err) => return Err(err).with_context(|| format!("reading todos from slot `{key}`")),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok((TodoList::new(), LoadState::Empty));
    }

    match serde_json::from_slice::<Option<TodoList>>(&bytes) {
        Ok(Some(list)) if !list.is_empty() => {
            let count = list.len();
            Ok((list, LoadState::Loaded { count }))
        }
        Ok(_) => Ok((TodoList::new(), LoadState::Empty)),
        Err(err) => {
            warn!(key, %err, "discarding malformed todo snapshot");
            Ok((
                TodoList::new(),
                LoadState::Discarded {
                    reason: err.to_string(),
                },
            ))
        }
    }
}

/// Timestamp ids, bumped past the newest id when the clock has not moved on.
/// If the newest id is `TodoId::MAX`, the first free id at or below `now` is used.
fn next_id(list: &TodoList, now: TodoId) -> TodoId {
    let Some(max) = list.max_id() else {
        return now;
    };
    if max < now {
        return now;
    }
    if let Some(id) = max.checked_add(1) {
        return id;
    }
    (TodoId::MIN..=now)
        .rev()
        .find(|id| !list.contains(*id))
        .unwrap_or(TodoId::MIN)
}
