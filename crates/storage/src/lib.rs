#![forbid(unsafe_code)]

mod codec;
pub mod repository;
pub mod sqlite;

pub use repository::{
    ANSWERS_KEY, InMemoryRepository, ProgressRepository, SavedProgress, Storage, StorageError,
    TIME_KEY,
};
