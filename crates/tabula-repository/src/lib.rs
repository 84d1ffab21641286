//! Model storage and table editing for the Tabula decision-table engine
//!
//! This crate owns the editable side of the engine:
//!
//! - **Model stores**: discover and write model documents, on disk
//!   ([`FileSystemStore`]) or in memory ([`MemoryStore`])
//! - **Table repository**: look up models and decisions case-insensitively,
//!   read tables and replace them in the in-memory models
//! - **Persistence**: write an edited model back with a timestamped backup,
//!   degrading to in-memory only when the document cannot be written
//!
//! # Quick Start
//!
//! ```no_run
//! use tabula_repository::{FileSystemStore, TableRepository};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileSystemStore::new("models")?;
//!     let repo = TableRepository::new();
//!     repo.load(&store).await?;
//!
//!     let view = repo.get_table("loan", "approve").await?;
//!     println!("{}", view.serialized_table.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod persist;
pub mod repository;
pub mod store;

pub use config::{RepositoryConfig, RepositorySource};
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemStore;
pub use memory::MemoryStore;
pub use models::{
    InputSummary, ModelSchema, ModelSummary, ParsedRule, ParsedTable, SchemaInput, TableSummary,
    TableView,
};
pub use persist::{PersistStatus, Persister};
pub use repository::{ModelEntry, TableEdit, TableRepository};
pub use store::{ModelStore, StoredDocument};
