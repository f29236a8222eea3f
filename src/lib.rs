pub use inf::{Error, Result, cast};

#[cfg(feature = "sqlite")]
pub use sqlite;
