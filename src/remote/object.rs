//! Remote JavaScript object handle

use std::sync::Arc;

use super::accessor;
use crate::inspector::{Inspector, ObjectId, RemoteValue};
use crate::Error;

/// Handle on a JavaScript object living in the remote page
#[derive(Debug, Clone)]
pub struct RemoteObject {
    id: ObjectId,
    inspector: Arc<dyn Inspector>,
}

impl RemoteObject {
    pub fn new(id: ObjectId, inspector: Arc<dyn Inspector>) -> Self {
        Self { id, inspector }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn inspector(&self) -> &Arc<dyn Inspector> {
        &self.inspector
    }

    /// Evaluate `expression` against this object (e.g. `.title`, `[3]`)
    pub async fn call(&self, expression: &str) -> Result<RemoteValue, Error> {
        self.call_function(&accessor(expression)).await
    }

    /// Call an arbitrary function declaration with `this` bound to this object
    pub async fn call_function(&self, declaration: &str) -> Result<RemoteValue, Error> {
        self.inspector.call_function_on(&self.id, declaration).await
    }

    /// Evaluate `expression` and wrap the resulting object reference
    pub async fn call_object(&self, expression: &str) -> Result<RemoteObject, Error> {
        let id = self.call(expression).await?.into_object(expression)?;
        Ok(RemoteObject::new(id, Arc::clone(&self.inspector)))
    }
}

impl PartialEq for RemoteObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RemoteObject {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::MockInspector;
    use serde_json::json;

    #[tokio::test]
    async fn test_call_reads_property() {
        let inspector = Arc::new(MockInspector::new());
        let window = MockInspector::window_object();
        inspector.on_property(&window, ".name", RemoteValue::Value(json!("main")));

        let object = RemoteObject::new(window, inspector.clone());
        assert_eq!(object.call(".name").await.unwrap(), RemoteValue::Value(json!("main")));
    }

    #[tokio::test]
    async fn test_call_object_rejects_primitives() {
        let inspector = Arc::new(MockInspector::new());
        let window = MockInspector::window_object();
        inspector.on_property(&window, ".document", RemoteValue::Value(json!(42)));

        let object = RemoteObject::new(window, inspector.clone());
        assert!(matches!(object.call_object(".document").await, Err(Error::Remote(_))));
    }
}
