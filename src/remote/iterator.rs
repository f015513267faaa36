//! Lazy forward-only walk over an indexed remote collection

use serde_json::Value;
use tracing::error;

use super::object::RemoteObject;
use crate::inspector::RemoteValue;
use crate::Error;

/// Forward-only cursor over a remote array or NodeList
///
/// The size is captured once; each [`next`](Self::next) costs one remote call.
/// A failed call surfaces as an error and leaves the cursor where it was, so
/// [`has_next`](Self::has_next) stays the only authority on the end.
#[derive(Debug)]
pub struct RemoteObjectIterator {
    collection: RemoteObject,
    size: usize,
    index: usize,
}

impl RemoteObjectIterator {
    pub fn new(collection: RemoteObject, size: usize) -> Self {
        Self {
            collection,
            size,
            index: 0,
        }
    }

    /// Build a cursor sized by the collection's `length`
    pub async fn over(collection: RemoteObject) -> Result<Self, Error> {
        let length = collection.call(".length").await?;
        let size = match length {
            RemoteValue::Value(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| Error::remote(format!("Invalid collection length: {}", n)))?,
            other => {
                return Err(Error::remote(format!(
                    "Collection {} has no numeric length: {:?}",
                    collection.id(),
                    other
                )))
            }
        };
        Ok(Self::new(collection, size as usize))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn has_next(&self) -> bool {
        self.index < self.size
    }

    /// Fetch the element at the current position and advance
    pub async fn next(&mut self) -> Result<RemoteValue, Error> {
        if !self.has_next() {
            return Err(Error::internal(format!(
                "Iterator over {} exhausted after {} elements",
                self.collection.id(),
                self.size
            )));
        }

        match self.collection.call(&format!("[{}]", self.index)).await {
            Ok(value) => {
                self.index += 1;
                Ok(value)
            }
            Err(e) => {
                error!(
                    "Failed to fetch element {} of {}: {}",
                    self.index,
                    self.collection.id(),
                    e
                );
                Err(e)
            }
        }
    }

    pub fn remove(&mut self) -> Result<(), Error> {
        Err(Error::unsupported("RemoteObjectIterator does not support remove"))
    }
}
