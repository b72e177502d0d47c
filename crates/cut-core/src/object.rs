use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Opaque object handles & per-event collections
// ---------------------------------------------------------------------------

/// An opaque handle to one physical-object record. The engine never looks
/// inside — all field access goes through the
/// [`FieldAccessor`](crate::FieldAccessor) registry.
pub type ObjectHandle = Arc<dyn Any + Send + Sync>;

/// One ordered collection of objects for the current event, tagged with the
/// type name its objects were registered under.
#[derive(Clone)]
pub struct ObjectCollection {
    type_tag: String,
    objects: Vec<ObjectHandle>,
}

impl ObjectCollection {
    pub fn new(type_tag: impl Into<String>, objects: Vec<ObjectHandle>) -> Self {
        Self {
            type_tag: type_tag.into(),
            objects,
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> &ObjectHandle {
        &self.objects[index]
    }
}

/// The collections supplied by the event store for one event, plus the
/// names of the triggers that fired. Ordering within each collection is
/// stable for the duration of the event's decision (guaranteed by the
/// producer); the engine never mutates this.
#[derive(Clone, Default)]
pub struct EventObjects {
    collections: HashMap<String, ObjectCollection>,
    fired_triggers: Vec<String>,
}

impl EventObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection of pre-wrapped handles.
    pub fn insert(&mut self, name: impl Into<String>, collection: ObjectCollection) {
        self.collections.insert(name.into(), collection);
    }

    /// Convenience: wrap a vector of typed objects into handles.
    pub fn insert_objects<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        objects: Vec<T>,
    ) {
        let handles = objects
            .into_iter()
            .map(|o| Arc::new(o) as ObjectHandle)
            .collect();
        self.insert(name, ObjectCollection::new(type_tag, handles));
    }

    pub fn set_fired_triggers(&mut self, triggers: Vec<String>) {
        self.fired_triggers = triggers;
    }

    pub fn fired_triggers(&self) -> &[String] {
        &self.fired_triggers
    }

    /// The collection, or `None` when the event store did not provide it
    /// (a per-event condition, not an error — see the sentinel convention).
    pub fn get(&self, name: &str) -> Option<&ObjectCollection> {
        self.collections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }
}
