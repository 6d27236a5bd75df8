pub mod events;
pub mod file;
pub mod repository;
pub mod service;

pub use crate::file::JsonFileRepository;
pub use crate::repository::{HabitRepository, InMemoryRepository};
pub use crate::service::{HabitService, HabitServiceBuilder};
