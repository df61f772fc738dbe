//! A value that may be written as a lone item or as a list

use std::ops::{Deref, DerefMut};

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;

/// Ordered sequence that encodes a single element as the bare element
///
/// `"string"` and `["string"]` both decode to a one-element sequence; a
/// one-element sequence always encodes as `"string"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SingleOrArray<T>(Vec<T>);

impl<T> SingleOrArray<T> {
    pub fn single(item: T) -> Self {
        Self(vec![item])
    }

    /// Build from a list; `None` when the list is empty
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    /// The sole element, if exactly one is present
    pub fn as_single(&self) -> Option<&T> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl<T> From<T> for SingleOrArray<T> {
    fn from(item: T) -> Self {
        Self::single(item)
    }
}

impl<T> Deref for SingleOrArray<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for SingleOrArray<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a, T> IntoIterator for &'a SingleOrArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for SingleOrArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(codec::from_value::<T>)
                .collect::<crate::Result<Vec<_>>>()
                .map_err(de::Error::custom)?,
            single => vec![codec::from_value::<T>(single).map_err(de::Error::custom)?],
        };

        if items.is_empty() {
            return Err(de::Error::invalid_length(0, &"at least one element"));
        }
        Ok(Self(items))
    }
}

impl<T: Serialize> Serialize for SingleOrArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [only] => only.serialize(serializer),
            items => items.serialize(serializer),
        }
    }
}
