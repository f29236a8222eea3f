use std::ffi::c_int;

use crate::{Error, Extractable, Result, Statement};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Blob,
    Null,
    Text,
}

impl TryFrom<c_int> for ColumnType {
    type Error = Error;

    fn try_from(column_type: c_int) -> Result<Self> {
        match column_type {
            libsqlite3_sys::SQLITE_INTEGER => Ok(ColumnType::Integer),
            libsqlite3_sys::SQLITE_FLOAT => Ok(ColumnType::Float),
            libsqlite3_sys::SQLITE_BLOB => Ok(ColumnType::Blob),
            libsqlite3_sys::SQLITE_NULL => Ok(ColumnType::Null),
            libsqlite3_sys::SQLITE_TEXT => Ok(ColumnType::Text),
            _ => Err(Error::Runtime(format!("Invalid column type: {column_type}"))),
        }
    }
}

/// View on the current result row of a statement.
///
/// The borrow on the statement guarantees the row is gone before the statement steps again or is
/// finalized, so the text and blob slices handed out here never dangle.
#[derive(Clone, Copy)]
pub struct Row<'stmt> {
    stmt: &'stmt Statement<'stmt>,
}

impl<'stmt> Row<'stmt> {
    pub(crate) fn new(stmt: &'stmt Statement<'stmt>) -> Self {
        Self { stmt }
    }

    pub fn column_count(&self) -> Result<usize> {
        self.stmt.column_count()
    }

    pub fn get<T: Extractable>(&self, index: usize) -> Result<T> {
        self.stmt.column(index)
    }

    pub fn get_str(&self, index: usize) -> Result<&'stmt str> {
        self.stmt.column_str(index)
    }

    pub fn get_blob(&self, index: usize) -> Result<&'stmt [u8]> {
        self.stmt.column_blob(index)
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        self.stmt.column_type(index)
    }

    pub fn column_is_null(&self, index: usize) -> Result<bool> {
        self.stmt.column_is_null(index)
    }

    pub fn column_name(&self, index: usize) -> Result<&'stmt str> {
        self.stmt.column_name(index)
    }
}
