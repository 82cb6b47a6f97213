mod error;
mod paths;
mod replay;
mod schema;
mod store;

pub use error::HistoryStoreError;
pub use paths::{default_history_path, home_dir, HISTORY_FILE_NAME};
pub use replay::replay_commands;
pub use schema::HistoryRecord;
pub use store::HistoryStore;
