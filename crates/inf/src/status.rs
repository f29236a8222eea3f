//! Classification of sqlite result codes.
//!
//! Every primary and extended result code the engine can report maps onto a [`StatusKind`].
//! The kinds form a fixed two-level tree rooted at [`StatusKind::Generic`]: an extended code is a
//! child of its primary code, and every primary code is a child of the root.
//! Unknown codes classify as [`StatusKind::Generic`].

use std::ffi::c_int;
use std::fmt;

use thiserror::Error;

macro_rules! status_kinds {
    ($($kind:ident => $code:ident, $parent:ident, $name:literal;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusKind {
            Generic,
            $($kind,)*
        }

        impl StatusKind {
            pub const ALL: &'static [StatusKind] = &[StatusKind::Generic, $(StatusKind::$kind,)*];

            pub fn from_code(code: c_int) -> Self {
                match code {
                    $(libsqlite3_sys::$code => StatusKind::$kind,)*
                    _ => StatusKind::Generic,
                }
            }

            /// The native result code this kind was classified from
            pub fn code(self) -> c_int {
                match self {
                    StatusKind::Generic => libsqlite3_sys::SQLITE_ERROR,
                    $(StatusKind::$kind => libsqlite3_sys::$code,)*
                }
            }

            pub fn parent(self) -> Option<StatusKind> {
                match self {
                    StatusKind::Generic => None,
                    $(StatusKind::$kind => Some(StatusKind::$parent),)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    StatusKind::Generic => "error",
                    $(StatusKind::$kind => $name,)*
                }
            }
        }
    };
}

status_kinds! {
    Abort => SQLITE_ABORT, Generic, "abort";
    Auth => SQLITE_AUTH, Generic, "auth";
    Busy => SQLITE_BUSY, Generic, "busy";
    CantOpen => SQLITE_CANTOPEN, Generic, "cantopen";
    Constraint => SQLITE_CONSTRAINT, Generic, "constraint";
    Corrupt => SQLITE_CORRUPT, Generic, "corrupt";
    Empty => SQLITE_EMPTY, Generic, "empty";
    Format => SQLITE_FORMAT, Generic, "format";
    Full => SQLITE_FULL, Generic, "full";
    Internal => SQLITE_INTERNAL, Generic, "internal";
    Interrupt => SQLITE_INTERRUPT, Generic, "interrupt";
    IoErr => SQLITE_IOERR, Generic, "ioerr";
    Locked => SQLITE_LOCKED, Generic, "locked";
    Mismatch => SQLITE_MISMATCH, Generic, "mismatch";
    Misuse => SQLITE_MISUSE, Generic, "misuse";
    NoLfs => SQLITE_NOLFS, Generic, "nolfs";
    NoMem => SQLITE_NOMEM, Generic, "nomem";
    NotADb => SQLITE_NOTADB, Generic, "notadb";
    NotFound => SQLITE_NOTFOUND, Generic, "notfound";
    Perm => SQLITE_PERM, Generic, "perm";
    Protocol => SQLITE_PROTOCOL, Generic, "protocol";
    Range => SQLITE_RANGE, Generic, "range";
    ReadOnly => SQLITE_READONLY, Generic, "readonly";
    Row => SQLITE_ROW, Generic, "row";
    Schema => SQLITE_SCHEMA, Generic, "schema";
    TooBig => SQLITE_TOOBIG, Generic, "toobig";
    Warning => SQLITE_WARNING, Generic, "warning";

    AbortRollback => SQLITE_ABORT_ROLLBACK, Abort, "abort_rollback";
    BusyRecovery => SQLITE_BUSY_RECOVERY, Busy, "busy_recovery";
    BusySnapshot => SQLITE_BUSY_SNAPSHOT, Busy, "busy_snapshot";
    CantOpenConvPath => SQLITE_CANTOPEN_CONVPATH, CantOpen, "cantopen_convpath";
    CantOpenFullPath => SQLITE_CANTOPEN_FULLPATH, CantOpen, "cantopen_fullpath";
    CantOpenIsDir => SQLITE_CANTOPEN_ISDIR, CantOpen, "cantopen_isdir";
    ConstraintCheck => SQLITE_CONSTRAINT_CHECK, Constraint, "constraint_check";
    ConstraintCommitHook => SQLITE_CONSTRAINT_COMMITHOOK, Constraint, "constraint_commithook";
    ConstraintForeignKey => SQLITE_CONSTRAINT_FOREIGNKEY, Constraint, "constraint_foreignkey";
    ConstraintFunction => SQLITE_CONSTRAINT_FUNCTION, Constraint, "constraint_function";
    ConstraintNotNull => SQLITE_CONSTRAINT_NOTNULL, Constraint, "constraint_notnull";
    ConstraintPrimaryKey => SQLITE_CONSTRAINT_PRIMARYKEY, Constraint, "constraint_primarykey";
    ConstraintRowId => SQLITE_CONSTRAINT_ROWID, Constraint, "constraint_rowid";
    ConstraintTrigger => SQLITE_CONSTRAINT_TRIGGER, Constraint, "constraint_trigger";
    ConstraintUnique => SQLITE_CONSTRAINT_UNIQUE, Constraint, "constraint_unique";
    ConstraintVtab => SQLITE_CONSTRAINT_VTAB, Constraint, "constraint_vtab";
    CorruptVtab => SQLITE_CORRUPT_VTAB, Corrupt, "corrupt_vtab";
    IoErrAccess => SQLITE_IOERR_ACCESS, IoErr, "ioerr_access";
    IoErrCheckReservedLock => SQLITE_IOERR_CHECKRESERVEDLOCK, IoErr, "ioerr_checkreservedlock";
    IoErrClose => SQLITE_IOERR_CLOSE, IoErr, "ioerr_close";
    IoErrConvPath => SQLITE_IOERR_CONVPATH, IoErr, "ioerr_convpath";
    IoErrDelete => SQLITE_IOERR_DELETE, IoErr, "ioerr_delete";
    IoErrDeleteNoEnt => SQLITE_IOERR_DELETE_NOENT, IoErr, "ioerr_delete_noent";
    IoErrDirFsync => SQLITE_IOERR_DIR_FSYNC, IoErr, "ioerr_dir_fsync";
    IoErrFstat => SQLITE_IOERR_FSTAT, IoErr, "ioerr_fstat";
    IoErrFsync => SQLITE_IOERR_FSYNC, IoErr, "ioerr_fsync";
    IoErrGetTempPath => SQLITE_IOERR_GETTEMPPATH, IoErr, "ioerr_gettemppath";
    IoErrLock => SQLITE_IOERR_LOCK, IoErr, "ioerr_lock";
    IoErrMmap => SQLITE_IOERR_MMAP, IoErr, "ioerr_mmap";
    IoErrNoMem => SQLITE_IOERR_NOMEM, IoErr, "ioerr_nomem";
    IoErrRdLock => SQLITE_IOERR_RDLOCK, IoErr, "ioerr_rdlock";
    IoErrRead => SQLITE_IOERR_READ, IoErr, "ioerr_read";
    IoErrSeek => SQLITE_IOERR_SEEK, IoErr, "ioerr_seek";
    IoErrShmMap => SQLITE_IOERR_SHMMAP, IoErr, "ioerr_shmmap";
    IoErrShmOpen => SQLITE_IOERR_SHMOPEN, IoErr, "ioerr_shmopen";
    IoErrShmSize => SQLITE_IOERR_SHMSIZE, IoErr, "ioerr_shmsize";
    IoErrShortRead => SQLITE_IOERR_SHORT_READ, IoErr, "ioerr_short_read";
    IoErrTruncate => SQLITE_IOERR_TRUNCATE, IoErr, "ioerr_truncate";
    IoErrUnlock => SQLITE_IOERR_UNLOCK, IoErr, "ioerr_unlock";
    IoErrWrite => SQLITE_IOERR_WRITE, IoErr, "ioerr_write";
    LockedSharedCache => SQLITE_LOCKED_SHAREDCACHE, Locked, "locked_sharedcache";
    ReadOnlyCantLock => SQLITE_READONLY_CANTLOCK, ReadOnly, "readonly_cantlock";
    ReadOnlyDbMoved => SQLITE_READONLY_DBMOVED, ReadOnly, "readonly_dbmoved";
    ReadOnlyRecovery => SQLITE_READONLY_RECOVERY, ReadOnly, "readonly_recovery";
    ReadOnlyRollback => SQLITE_READONLY_ROLLBACK, ReadOnly, "readonly_rollback";
}

impl StatusKind {
    /// The kind itself followed by its parent chain up to [`StatusKind::Generic`]
    pub fn ancestors(self) -> impl Iterator<Item = StatusKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    pub fn is_a(self, ancestor: StatusKind) -> bool {
        self.ancestors().any(|kind| kind == ancestor)
    }

    /// Busy and locked conditions may succeed when the caller tries again later
    pub fn is_transient(self) -> bool {
        self.is_a(StatusKind::Busy) || self.is_a(StatusKind::Locked)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An engine failure: the classified kind, the raw extended result code and the engine message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({kind})")]
pub struct StatusError {
    kind: StatusKind,
    code: c_int,
    message: String,
}

impl StatusError {
    pub fn new(code: c_int, message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::from_code(code),
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn code(&self) -> c_int {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, kind: StatusKind) -> bool {
        self.kind.is_a(kind)
    }
}
