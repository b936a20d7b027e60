pub mod executor;
pub mod value;

pub use executor::{QueryError, QueryExecutor};
pub use value::{ResultSet, Row, SqlValue};
