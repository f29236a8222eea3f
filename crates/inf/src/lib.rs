#![cfg_attr(docsrs, feature(doc_cfg))]

pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod cast;
mod error;
#[cfg(feature = "sqlite3")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite3")))]
pub mod status;

#[cfg(feature = "sqlite3")]
#[doc(inline)]
pub use status::{StatusError, StatusKind};
