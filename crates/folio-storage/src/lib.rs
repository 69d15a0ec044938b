pub mod executor;
pub mod mem;
pub mod persistent;
pub mod traits;
pub mod wal;

pub use executor::{Outcome, Page, PipelineExecutor};
pub use mem::InMemoryStore;
pub use persistent::PersistentStore;
pub use traits::*;
