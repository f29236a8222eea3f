use crate::{AccessMode, Error, OpenFlags, Result, Statement, StatusError};
use inf::cast::narrow;
use std::ffi::{CStr, c_char, c_int};
use std::path::Path;
use std::time::Duration;

// Exported by the bundled library but missing from libsqlite3-sys's pregenerated bindings.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut libsqlite3_sys::sqlite3) -> c_int;
}

/// An open database, exclusively owning the native connection handle.
///
/// The handle is released by [`Connection::close`] or when the connection is dropped.
/// Statements borrow the connection, so it cannot be closed while statements are alive.
pub struct Connection {
    db: *mut libsqlite3_sys::sqlite3,
}

impl Connection {
    pub fn open(db_path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        let db_path = db_path.as_ref();
        let mut db: *mut libsqlite3_sys::sqlite3 = std::ptr::null_mut();
        let c_path = std::ffi::CString::new(db_path.to_string_lossy().to_string())?;
        let rc = unsafe { libsqlite3_sys::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags.bits(), std::ptr::null()) };
        if rc != libsqlite3_sys::SQLITE_OK {
            // the engine usually allocates a handle even when opening fails
            let error = last_status(db);
            unsafe { libsqlite3_sys::sqlite3_close(db) };
            return Err(Error::DatabaseError(error));
        }

        log::debug!("Opened database: {}", db_path.display());
        Ok(Self { db })
    }

    pub fn new(db_path: &Path, mode: AccessMode) -> Result<Self> {
        Connection::open(db_path, OpenFlags::from(mode))
    }

    pub fn open_in_memory() -> Result<Self> {
        Connection::open(":memory:", OpenFlags::default())
    }

    /// Releases the native handle, calling this on a closed connection does nothing.
    pub fn close(&mut self) {
        if self.db.is_null() {
            return;
        }

        let rc = unsafe { sqlite3_close_v2(self.db) };
        if rc != libsqlite3_sys::SQLITE_OK {
            log::warn!("Failed to close database cleanly: {}", last_status(self.db));
        } else {
            log::debug!("Closed database");
        }
        self.db = std::ptr::null_mut();
    }

    pub fn is_open(&self) -> bool {
        !self.db.is_null()
    }

    pub fn path(&self) -> Option<String> {
        if self.db.is_null() {
            return None;
        }

        let filename = unsafe { libsqlite3_sys::sqlite3_db_filename(self.db, std::ptr::null()) };
        if !filename.is_null() {
            let c_str = unsafe { CStr::from_ptr(filename.cast::<c_char>()) };
            return Some(c_str.to_string_lossy().to_string());
        }
        None
    }

    /// Prepares the first statement in `sql`.
    ///
    /// Returns the statement together with the part of `sql` that was not consumed. When `sql`
    /// only holds whitespace or comments the returned statement is not prepared.
    pub fn prepare<'sql>(&self, sql: &'sql str) -> Result<(Statement<'_>, &'sql str)> {
        let db = self.handle()?;
        if sql.is_empty() {
            return Err(Error::InvalidArgument("sql".to_string()));
        }

        let size: c_int = narrow(sql.len())?;
        let mut stmt: *mut libsqlite3_sys::sqlite3_stmt = std::ptr::null_mut();
        let mut tail: *const c_char = std::ptr::null();
        let rc = unsafe {
            libsqlite3_sys::sqlite3_prepare_v2(db, sql.as_ptr().cast::<c_char>(), size, &mut stmt, &mut tail)
        };
        if rc != libsqlite3_sys::SQLITE_OK {
            return Err(Error::DatabaseError(last_status(db)));
        }

        let consumed = if tail.is_null() {
            sql.len()
        } else {
            (tail as usize).saturating_sub(sql.as_ptr() as usize).min(sql.len())
        };

        let tail = sql
            .get(consumed..)
            .ok_or_else(|| Error::Runtime(format!("Statement ended inside a character at byte {consumed}")))?;

        Ok((Statement::new(stmt), tail))
    }

    /// Lets the engine wait up to `timeout` for a lock before reporting a busy condition
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        let db = self.handle()?;
        let millis: c_int = narrow(timeout.as_millis())?;
        let rc = unsafe { libsqlite3_sys::sqlite3_busy_timeout(db, millis) };
        if rc != libsqlite3_sys::SQLITE_OK {
            return Err(Error::DatabaseError(last_status(db)));
        }

        Ok(())
    }

    /// Rows modified by the most recently completed insert, update or delete
    pub fn changes(&self) -> Result<u64> {
        let db = self.handle()?;
        narrow(unsafe { libsqlite3_sys::sqlite3_changes64(db) })
    }

    pub fn last_insert_rowid(&self) -> Result<i64> {
        let db = self.handle()?;
        Ok(unsafe { libsqlite3_sys::sqlite3_last_insert_rowid(db) })
    }

    pub fn last_error(&self) -> Result<String> {
        Ok(self.last_status()?.message().to_string())
    }

    pub fn last_status(&self) -> Result<StatusError> {
        Ok(last_status(self.handle()?))
    }

    fn handle(&self) -> Result<*mut libsqlite3_sys::sqlite3> {
        if self.db.is_null() {
            return Err(Error::InvalidArgument("connection".to_string()));
        }

        Ok(self.db)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self { db: std::ptr::null_mut() }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Classifies the most recent failure reported on `db` using its extended result code
pub(crate) fn last_status(db: *mut libsqlite3_sys::sqlite3) -> StatusError {
    let code = unsafe { libsqlite3_sys::sqlite3_extended_errcode(db) };
    let error_message = unsafe { libsqlite3_sys::sqlite3_errmsg(db) };
    let message = if error_message.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(error_message) }.to_string_lossy().into_owned()
    };

    StatusError::new(code, message)
}
