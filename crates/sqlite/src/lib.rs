//! This module contains a typed sqlite wrapper on top of the sqlite3-sys crate
//!
//! Values are bound and extracted through the [`Bindable`] and [`Extractable`] traits, integer
//! conversions are range checked in both directions and every engine failure is reported as a
//! classified [`StatusError`].
//!
//! ```no_run
//! use sqlite::{params, Connection};
//!
//! # fn main() -> sqlite::Result<()> {
//! let conn = Connection::open_in_memory()?;
//! conn.execute("CREATE TABLE t (key TEXT, value INTEGER); INSERT INTO t VALUES (?, ?);", params!["a", 1])?;
//! let rows: Vec<(String, i64)> = conn.vexec("SELECT key, value FROM t", &[])?;
//! # Ok(())
//! # }
//! ```

use std::ffi::c_int;

mod connection;
pub mod exec;
mod row;
mod statement;
mod value;

#[derive(Debug, Copy, Clone)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
    Create,
}

bitflags::bitflags! {
    /// Flags passed to the engine when opening a database
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: c_int {
        const READ_ONLY = libsqlite3_sys::SQLITE_OPEN_READONLY;
        const READ_WRITE = libsqlite3_sys::SQLITE_OPEN_READWRITE;
        const CREATE = libsqlite3_sys::SQLITE_OPEN_CREATE;
        const URI = libsqlite3_sys::SQLITE_OPEN_URI;
        const MEMORY = libsqlite3_sys::SQLITE_OPEN_MEMORY;
        const NO_MUTEX = libsqlite3_sys::SQLITE_OPEN_NOMUTEX;
        const FULL_MUTEX = libsqlite3_sys::SQLITE_OPEN_FULLMUTEX;
        const SHARED_CACHE = libsqlite3_sys::SQLITE_OPEN_SHAREDCACHE;
        const PRIVATE_CACHE = libsqlite3_sys::SQLITE_OPEN_PRIVATECACHE;
    }
}

impl Default for OpenFlags {
    fn default() -> Self {
        OpenFlags::READ_WRITE | OpenFlags::CREATE
    }
}

impl From<AccessMode> for OpenFlags {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::ReadOnly => OpenFlags::READ_ONLY,
            AccessMode::ReadWrite => OpenFlags::READ_WRITE,
            AccessMode::Create => OpenFlags::READ_WRITE | OpenFlags::CREATE,
        }
    }
}

/// Builds the flat parameter list taken by the execution functions
///
/// ```no_run
/// # use sqlite::{params, Connection};
/// # fn main() -> sqlite::Result<()> {
/// # let conn = Connection::open_in_memory()?;
/// let name = String::from("answer");
/// conn.execute("INSERT INTO kv VALUES (?, ?)", params![name, 42])?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[] as &[&dyn $crate::Bindable]
    };
    ($($param:expr),+ $(,)?) => {
        &[$(&$param as &dyn $crate::Bindable),+] as &[&dyn $crate::Bindable]
    };
}

pub use connection::Connection;
pub use exec::FromRow;
pub use row::{ColumnType, Row};
pub use statement::{Statement, StepResult};
pub use value::{Bindable, Extractable, Null, Value, ValueTag};

pub use inf::{StatusError, StatusKind};
pub type Error = inf::Error;
pub type Result<T> = inf::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_open_flags() {
        assert_eq!(
            OpenFlags::default().bits(),
            libsqlite3_sys::SQLITE_OPEN_READWRITE | libsqlite3_sys::SQLITE_OPEN_CREATE
        );
        assert_eq!(OpenFlags::from(AccessMode::ReadOnly), OpenFlags::READ_ONLY);
        assert_eq!(OpenFlags::from(AccessMode::Create), OpenFlags::default());
    }

    #[test_log::test]
    fn test_params_macro() {
        let name = String::from("x");
        let params = params![1u8, name, "y", None::<i32>];
        let tags: Vec<ValueTag> = params.iter().map(|p| p.to_value().tag()).collect();
        assert_eq!(tags, vec![ValueTag::UInt8, ValueTag::Text, ValueTag::Text, ValueTag::Null]);
        assert!(params![].is_empty());
    }
}
