//! Iteration over the top level of a node.

use core::slice;

use crate::Value;

/// Top-level tags of a node, in insertion order.
#[derive(Debug, Clone)]
pub struct TagIter<'a> {
    inner: slice::Iter<'a, (u64, Value)>,
}

impl<'a> TagIter<'a> {
    pub(crate) fn new(entries: &'a [(u64, Value)]) -> Self {
        Self {
            inner: entries.iter(),
        }
    }
}

impl Iterator for TagIter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(tag, _)| *tag)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TagIter<'_> {}

/// Top-level `(tag, value)` pairs of a node, in insertion order.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: slice::Iter<'a, (u64, Value)>,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(entries: &'a [(u64, Value)]) -> Self {
        Self {
            inner: entries.iter(),
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (u64, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(tag, value)| (*tag, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
