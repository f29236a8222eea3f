//! The closed set of value kinds that can be bound to a parameter slot or read back from a column.
//!
//! A Rust type takes part in binding by implementing [`Bindable`], which lowers it to a tagged
//! [`Value`], and in extraction by implementing [`Extractable`]. The primitive kinds are all
//! registered in this file, adding a kind means adding one entry there
//! and one arm to the native bind dispatch in [`crate::Statement::bind_value`].

use crate::{Result, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Null,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Text,
    Blob,
}

/// A borrowed value tagged with its kind, one entry of a flat parameter list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl Value<'_> {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::Int8(_) => ValueTag::Int8,
            Value::UInt8(_) => ValueTag::UInt8,
            Value::Int16(_) => ValueTag::Int16,
            Value::UInt16(_) => ValueTag::UInt16,
            Value::Int32(_) => ValueTag::Int32,
            Value::UInt32(_) => ValueTag::UInt32,
            Value::Int64(_) => ValueTag::Int64,
            Value::UInt64(_) => ValueTag::UInt64,
            Value::Float32(_) => ValueTag::Float32,
            Value::Float64(_) => ValueTag::Float64,
            Value::Text(_) => ValueTag::Text,
            Value::Blob(_) => ValueTag::Blob,
        }
    }
}

/// Marker that binds an engine NULL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Null;

pub trait Bindable {
    fn to_value(&self) -> Value<'_>;
}

pub trait Extractable: Sized {
    /// Reads column `index` of the current row, failing instead of truncating when the stored
    /// value does not fit in `Self`
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self>;
}

impl<T: Bindable + ?Sized> Bindable for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl Bindable for Value<'_> {
    fn to_value(&self) -> Value<'_> {
        *self
    }
}

impl Bindable for Null {
    fn to_value(&self) -> Value<'_> {
        Value::Null
    }
}

impl<T: Bindable> Bindable for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: Extractable> Extractable for Option<T> {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        if stmt.column_is_null(index)? {
            Ok(None)
        } else {
            T::extract(stmt, index).map(Some)
        }
    }
}

macro_rules! integer_kinds {
    ($($ty:ty => $tag:ident;)*) => {
        $(
            impl Bindable for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::$tag(*self)
                }
            }

            impl Extractable for $ty {
                fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
                    inf::cast::narrow(stmt.column_int64(index)?)
                }
            }
        )*
    };
}

integer_kinds! {
    i8 => Int8;
    u8 => UInt8;
    i16 => Int16;
    u16 => UInt16;
    i32 => Int32;
    u32 => UInt32;
    i64 => Int64;
    u64 => UInt64;
}

impl Bindable for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Int8(i8::from(*self))
    }
}

impl Extractable for bool {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        Ok(stmt.column_int64(index)? != 0)
    }
}

impl Bindable for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Float32(*self)
    }
}

impl Extractable for f32 {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        inf::cast::narrow(stmt.column_double(index)?)
    }
}

impl Bindable for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Float64(*self)
    }
}

impl Extractable for f64 {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        stmt.column_double(index)
    }
}

impl Bindable for str {
    fn to_value(&self) -> Value<'_> {
        Value::Text(self)
    }
}

impl Bindable for String {
    fn to_value(&self) -> Value<'_> {
        Value::Text(self.as_str())
    }
}

impl Extractable for String {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        Ok(stmt.column_str(index)?.to_owned())
    }
}

impl Bindable for [u8] {
    fn to_value(&self) -> Value<'_> {
        Value::Blob(self)
    }
}

impl Bindable for Vec<u8> {
    fn to_value(&self) -> Value<'_> {
        Value::Blob(self.as_slice())
    }
}

impl Extractable for Vec<u8> {
    fn extract(stmt: &Statement<'_>, index: usize) -> Result<Self> {
        Ok(stmt.column_blob(index)?.to_vec())
    }
}

#[cfg(test)]
#[generic_tests::define]
mod generictests {
    use super::*;
    use crate::{Connection, Error};
    use num::{Bounded, NumCast};

    fn select_value<T: Bindable + Extractable>(value: T) -> crate::Result<T> {
        let conn = Connection::open_in_memory()?;
        let (mut stmt, _) = conn.prepare("SELECT ?")?;
        stmt.bind(1, &value)?;
        stmt.step()?;
        stmt.column::<T>(0)
    }

    fn select_literal<T: Extractable>(value: i64) -> crate::Result<T> {
        let conn = Connection::open_in_memory()?;
        let (mut stmt, _) = conn.prepare("SELECT ?")?;
        stmt.bind(1, &value)?;
        stmt.step()?;
        stmt.column::<T>(0)
    }

    #[test]
    fn test_round_trip_bounds<T>()
    where
        T: Bindable + Extractable + Bounded + NumCast + PartialEq + std::fmt::Debug + Copy,
    {
        // u64::MAX cannot be stored, the largest storable unsigned value is i64::MAX
        let max = match <i64 as NumCast>::from(T::max_value()) {
            Some(_) => T::max_value(),
            None => <T as NumCast>::from(i64::MAX).unwrap(),
        };

        for value in [T::min_value(), max, <T as NumCast>::from(1).unwrap()] {
            assert_eq!(select_value(value).unwrap(), value);
        }
    }

    #[test]
    fn test_extract_overflow<T>()
    where
        T: Extractable + Bounded + NumCast + std::fmt::Debug,
    {
        let max = <i64 as NumCast>::from(T::max_value()).unwrap_or(i64::MAX);
        if max < i64::MAX {
            assert!(matches!(select_literal::<T>(max + 1), Err(Error::Overflow(_))));
        }
    }

    #[test]
    fn test_extract_underflow<T>()
    where
        T: Extractable + Bounded + NumCast + std::fmt::Debug,
    {
        let min = <i64 as NumCast>::from(T::min_value()).unwrap();
        if min > i64::MIN {
            assert!(matches!(select_literal::<T>(min - 1), Err(Error::Underflow(_))));
        }
    }

    #[instantiate_tests(<i8>)]
    mod value_i8 {}

    #[instantiate_tests(<u8>)]
    mod value_u8 {}

    #[instantiate_tests(<i16>)]
    mod value_i16 {}

    #[instantiate_tests(<u16>)]
    mod value_u16 {}

    #[instantiate_tests(<i32>)]
    mod value_i32 {}

    #[instantiate_tests(<u32>)]
    mod value_u32 {}

    #[instantiate_tests(<i64>)]
    mod value_i64 {}

    #[instantiate_tests(<u64>)]
    mod value_u64 {}
}
