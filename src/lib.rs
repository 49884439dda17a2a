pub mod app;
pub mod clock;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use clock::{Clock, SystemClock};
pub use errors::{AppError, StorageError};
pub use state::AppState;
pub use storage::{FileBackend, KeyValueStore, MemoryBackend, resolve_data_path};
pub use store::{ActivityStore, Command, CommandOutcome};
