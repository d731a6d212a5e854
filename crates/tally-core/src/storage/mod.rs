mod slot_store;

pub use slot_store::{validate_key, InMemorySlotStore, SlotError, SlotStore};
