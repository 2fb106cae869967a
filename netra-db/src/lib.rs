mod error;
mod reader;
mod schema;
mod store;

pub use error::DbError;
pub use reader::SafeRow;
pub use schema::{ColumnRename, COLUMN_RENAMES};
pub use store::DatasetStore;
