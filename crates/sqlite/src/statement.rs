use std::ffi::{CStr, c_char, c_int, c_void};
use std::marker::PhantomData;

use inf::cast::narrow;

use crate::connection::last_status;
use crate::{Bindable, ColumnType, Connection, Error, Extractable, Result, Row, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepResult {
    Row,
    Done,
}

/// A prepared statement, it owns the native statement handle and borrows the connection it was
/// prepared on.
///
/// A statement prepared from text without any SQL in it (whitespace, comments) owns no handle,
/// all operations except [`Statement::finalize`] fail on such a statement.
pub struct Statement<'conn> {
    stmt: *mut libsqlite3_sys::sqlite3_stmt,
    _conn: PhantomData<&'conn Connection>,
}

/// The native call a bound value resolves to, computed before the engine is touched
enum NativeBinding<'a> {
    Null,
    Int(c_int),
    Int64(i64),
    Double(f64),
    Text(&'a str, c_int),
    Blob(&'a [u8], c_int),
}

impl<'a> NativeBinding<'a> {
    fn from_value(value: Value<'a>) -> Result<Self> {
        Ok(match value {
            Value::Null => NativeBinding::Null,
            Value::Int8(v) => NativeBinding::Int(c_int::from(v)),
            Value::UInt8(v) => NativeBinding::Int(c_int::from(v)),
            Value::Int16(v) => NativeBinding::Int(c_int::from(v)),
            Value::UInt16(v) => NativeBinding::Int(c_int::from(v)),
            Value::Int32(v) => NativeBinding::Int(v),
            Value::UInt32(v) => NativeBinding::Int64(i64::from(v)),
            Value::Int64(v) => NativeBinding::Int64(v),
            Value::UInt64(v) => NativeBinding::Int64(narrow(v)?),
            Value::Float32(v) => NativeBinding::Double(f64::from(v)),
            Value::Float64(v) => NativeBinding::Double(v),
            Value::Text(v) => NativeBinding::Text(v, narrow(v.len())?),
            Value::Blob(v) => NativeBinding::Blob(v, narrow(v.len())?),
        })
    }
}

impl Default for Statement<'_> {
    fn default() -> Self {
        Self::new(std::ptr::null_mut())
    }
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(stmt: *mut libsqlite3_sys::sqlite3_stmt) -> Self {
        Self {
            stmt,
            _conn: PhantomData,
        }
    }

    pub fn is_prepared(&self) -> bool {
        !self.stmt.is_null()
    }

    pub fn step(&mut self) -> Result<StepResult> {
        let stmt = self.handle()?;
        match unsafe { libsqlite3_sys::sqlite3_step(stmt) } {
            libsqlite3_sys::SQLITE_ROW => Ok(StepResult::Row),
            libsqlite3_sys::SQLITE_DONE => Ok(StepResult::Done),
            _ => Err(self.status_error()),
        }
    }

    /// Steps the statement and returns a view on the produced row, `None` once the statement is done
    pub fn next_row(&mut self) -> Result<Option<Row<'_>>> {
        match self.step()? {
            StepResult::Row => Ok(Some(Row::new(self))),
            StepResult::Done => Ok(None),
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        let stmt = self.handle()?;
        self.check_rc(unsafe { libsqlite3_sys::sqlite3_reset(stmt) })
    }

    pub fn clear_bindings(&mut self) -> Result<()> {
        let stmt = self.handle()?;
        self.check_rc(unsafe { libsqlite3_sys::sqlite3_clear_bindings(stmt) })
    }

    /// Releases the native handle. The handle is gone afterwards even when the engine reports a
    /// failure, so finalizing twice is harmless.
    pub fn finalize(&mut self) -> Result<()> {
        if self.stmt.is_null() {
            return Ok(());
        }

        let db = unsafe { libsqlite3_sys::sqlite3_db_handle(self.stmt) };
        let rc = unsafe { libsqlite3_sys::sqlite3_finalize(self.stmt) };
        self.stmt = std::ptr::null_mut();
        if rc != libsqlite3_sys::SQLITE_OK {
            return Err(Error::DatabaseError(last_status(db)));
        }

        Ok(())
    }

    /// The text this statement was prepared from
    pub fn sql(&self) -> Result<&str> {
        let stmt = self.handle()?;
        let sql = unsafe { libsqlite3_sys::sqlite3_sql(stmt) };
        if sql.is_null() {
            return Ok("");
        }

        Ok(unsafe { CStr::from_ptr(sql) }.to_str()?)
    }

    pub fn bind_parameter_count(&self) -> Result<usize> {
        let stmt = self.handle()?;
        Ok(unsafe { libsqlite3_sys::sqlite3_bind_parameter_count(stmt) } as usize)
    }

    /// Binds `value` to the 1-based parameter slot `index`.
    ///
    /// Values the engine cannot store (an `u64` above `i64::MAX`, text or blobs longer than
    /// `i32::MAX` bytes) fail with an overflow before any engine call. Text and blobs are copied by
    /// the engine, the caller's buffer only needs to live for the duration of the call.
    pub fn bind<T: Bindable + ?Sized>(&mut self, index: usize, value: &T) -> Result<()> {
        self.bind_value(index, value.to_value())
    }

    pub fn bind_value(&mut self, index: usize, value: Value<'_>) -> Result<()> {
        let stmt = self.handle()?;
        let binding = NativeBinding::from_value(value)?;
        let slot = self.parameter_slot(index)?;

        let rc = match binding {
            NativeBinding::Null => unsafe { libsqlite3_sys::sqlite3_bind_null(stmt, slot) },
            NativeBinding::Int(v) => unsafe { libsqlite3_sys::sqlite3_bind_int(stmt, slot, v) },
            NativeBinding::Int64(v) => unsafe { libsqlite3_sys::sqlite3_bind_int64(stmt, slot, v) },
            NativeBinding::Double(v) => unsafe { libsqlite3_sys::sqlite3_bind_double(stmt, slot, v) },
            NativeBinding::Text(v, len) => unsafe {
                libsqlite3_sys::sqlite3_bind_text(
                    stmt,
                    slot,
                    v.as_ptr().cast::<c_char>(),
                    len,
                    libsqlite3_sys::SQLITE_TRANSIENT(),
                )
            },
            NativeBinding::Blob(v, len) => unsafe {
                libsqlite3_sys::sqlite3_bind_blob(
                    stmt,
                    slot,
                    v.as_ptr().cast::<c_void>(),
                    len,
                    libsqlite3_sys::SQLITE_TRANSIENT(),
                )
            },
        };

        self.check_rc(rc)
    }

    pub fn column_count(&self) -> Result<usize> {
        let stmt = self.handle()?;
        Ok(unsafe { libsqlite3_sys::sqlite3_column_count(stmt) } as usize)
    }

    /// Number of columns holding data in the current row, 0 when the statement has no current row
    pub fn data_count(&self) -> Result<usize> {
        let stmt = self.handle()?;
        Ok(unsafe { libsqlite3_sys::sqlite3_data_count(stmt) } as usize)
    }

    pub fn column<T: Extractable>(&self, index: usize) -> Result<T> {
        T::extract(self, index)
    }

    pub fn column_int64(&self, index: usize) -> Result<i64> {
        let (stmt, column) = self.column_index(index)?;
        Ok(unsafe { libsqlite3_sys::sqlite3_column_int64(stmt, column) })
    }

    pub fn column_double(&self, index: usize) -> Result<f64> {
        let (stmt, column) = self.column_index(index)?;
        Ok(unsafe { libsqlite3_sys::sqlite3_column_double(stmt, column) })
    }

    /// Text of the column in the current row, an engine NULL reads as an empty string.
    /// The slice is only valid until the statement steps again.
    pub fn column_str(&self, index: usize) -> Result<&str> {
        let (stmt, column) = self.column_index(index)?;
        let data = unsafe { libsqlite3_sys::sqlite3_column_text(stmt, column) };
        // the byte count must be read after the text conversion
        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(stmt, column) };
        if data.is_null() || size <= 0 {
            return Ok("");
        }

        let bytes = unsafe { std::slice::from_raw_parts(data, size as usize) };
        Ok(std::str::from_utf8(bytes)?)
    }

    pub fn column_blob(&self, index: usize) -> Result<&[u8]> {
        let (stmt, column) = self.column_index(index)?;
        let data = unsafe { libsqlite3_sys::sqlite3_column_blob(stmt, column) };
        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(stmt, column) };
        if data.is_null() || size <= 0 {
            return Ok(&[]);
        }

        Ok(unsafe { std::slice::from_raw_parts(data.cast::<u8>(), size as usize) })
    }

    pub fn column_bytes(&self, index: usize) -> Result<usize> {
        let (stmt, column) = self.column_index(index)?;
        Ok(unsafe { libsqlite3_sys::sqlite3_column_bytes(stmt, column) } as usize)
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        let (stmt, column) = self.column_index(index)?;
        ColumnType::try_from(unsafe { libsqlite3_sys::sqlite3_column_type(stmt, column) })
    }

    pub fn column_is_null(&self, index: usize) -> Result<bool> {
        Ok(self.column_type(index)? == ColumnType::Null)
    }

    pub fn column_name(&self, index: usize) -> Result<&str> {
        let (stmt, column) = self.column_index(index)?;
        let name = unsafe { libsqlite3_sys::sqlite3_column_name(stmt, column) };
        if name.is_null() {
            return Err(Error::Runtime("Out of memory reading column name".to_string()));
        }

        Ok(unsafe { CStr::from_ptr(name) }.to_str()?)
    }

    /// The declared type of a table column, `None` for expressions
    pub fn column_decltype(&self, index: usize) -> Result<Option<&str>> {
        let (stmt, column) = self.column_index(index)?;
        optional_str(unsafe { libsqlite3_sys::sqlite3_column_decltype(stmt, column) })
    }

    /// Name of the table column the result column originates from, `None` for expressions
    pub fn column_origin_name(&self, index: usize) -> Result<Option<&str>> {
        let (stmt, column) = self.column_index(index)?;
        optional_str(unsafe { libsqlite3_sys::sqlite3_column_origin_name(stmt, column) })
    }

    pub fn column_table_name(&self, index: usize) -> Result<Option<&str>> {
        let (stmt, column) = self.column_index(index)?;
        optional_str(unsafe { libsqlite3_sys::sqlite3_column_table_name(stmt, column) })
    }

    pub fn column_database_name(&self, index: usize) -> Result<Option<&str>> {
        let (stmt, column) = self.column_index(index)?;
        optional_str(unsafe { libsqlite3_sys::sqlite3_column_database_name(stmt, column) })
    }

    fn handle(&self) -> Result<*mut libsqlite3_sys::sqlite3_stmt> {
        if self.stmt.is_null() {
            return Err(Error::InvalidArgument("statement".to_string()));
        }

        Ok(self.stmt)
    }

    fn parameter_slot(&self, index: usize) -> Result<c_int> {
        let count = self.bind_parameter_count()?;
        if index == 0 || index > count {
            return Err(Error::InvalidArgument(format!(
                "parameter index {index} out of range [1, {count}]"
            )));
        }

        narrow(index)
    }

    fn column_index(&self, index: usize) -> Result<(*mut libsqlite3_sys::sqlite3_stmt, c_int)> {
        let stmt = self.handle()?;
        let count = self.column_count()?;
        if index >= count {
            return Err(Error::InvalidArgument(format!(
                "column index {index} out of range [0, {count})"
            )));
        }

        Ok((stmt, narrow(index)?))
    }

    fn status_error(&self) -> Error {
        Error::DatabaseError(last_status(unsafe { libsqlite3_sys::sqlite3_db_handle(self.stmt) }))
    }

    fn check_rc(&self, rc: c_int) -> Result<()> {
        if rc != libsqlite3_sys::SQLITE_OK {
            return Err(self.status_error());
        }

        Ok(())
    }
}

fn optional_str<'a>(value: *const c_char) -> Result<Option<&'a str>> {
    if value.is_null() {
        return Ok(None);
    }

    Ok(Some(unsafe { CStr::from_ptr(value) }.to_str()?))
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            log::debug!("Finalize on drop reported: {e}");
        }
    }
}
