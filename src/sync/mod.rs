// src/sync/mod.rs

//! Client side of the quiz: push local changes, poll remote state, and
//! reconcile it without ever moving a participant back a question.

pub mod client;
pub mod countdown;
pub mod events;
pub mod local;
pub mod reconcile;
pub mod student;
pub mod teacher;

pub use client::SyncClient;
pub use events::{EventBus, SyncEvent};
pub use local::{FileLocalStorage, LocalStorage, MemoryLocalStorage};
pub use reconcile::Reconciler;
pub use student::StudentSession;
pub use teacher::TeacherSession;
