//! Item shapes for expanding stages.

use serde::{Deserialize, Serialize};

/// Either a lone value or a sequence of values.
///
/// `flat` and `flat_map` expand any `IntoIterator`. Use this type when a
/// single stream mixes nested sequences with plain values: a `One` is
/// yielded unchanged, a `Many` is expanded one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single value.
    One(T),
    /// A sequence of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Wraps a single value.
    pub fn one(value: T) -> Self {
        Self::One(value)
    }

    /// Wraps a sequence of values.
    pub fn many(values: impl IntoIterator<Item = T>) -> Self {
        Self::Many(values.into_iter().collect())
    }

    /// Returns true if this holds a sequence.
    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Number of values this expands to.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// Returns true if this expands to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = OneOrManyIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::One(value) => OneOrManyIter::One(Some(value).into_iter()),
            Self::Many(values) => OneOrManyIter::Many(values.into_iter()),
        }
    }
}

/// Iterator over the values of a [`OneOrMany`].
#[derive(Debug, Clone)]
pub enum OneOrManyIter<T> {
    #[doc(hidden)]
    One(std::option::IntoIter<T>),
    #[doc(hidden)]
    Many(std::vec::IntoIter<T>),
}

impl<T> Iterator for OneOrManyIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self {
            Self::One(iter) => iter.next(),
            Self::Many(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::One(iter) => iter.size_hint(),
            Self::Many(iter) => iter.size_hint(),
        }
    }
}
