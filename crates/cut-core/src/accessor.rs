use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Sentinel
// ---------------------------------------------------------------------------

/// Out-of-range marker meaning "value unavailable": the minimum
/// representable 32-bit integer, as a double. No legitimate physical
/// measurement produces this value, so downstream logic can always detect
/// and skip it. Comparisons against the sentinel never pass a cut.
pub const SENTINEL: f64 = i32::MIN as f64;

pub fn is_sentinel(value: f64) -> bool {
    value == SENTINEL
}

// ---------------------------------------------------------------------------
// FieldAccessor
// ---------------------------------------------------------------------------

type Getter = Arc<dyn Fn(&dyn Any) -> Option<f64> + Send + Sync>;
type DynResolver = Arc<dyn Fn(&dyn Any, &str) -> Option<f64> + Send + Sync>;

/// Registry mapping (type tag, field path) to an extraction closure,
/// populated once at startup per supported object type.
///
/// Lookup order: an exact `(type, field)` getter first, then the type's
/// dynamic resolver (used for schemaless objects such as parsed JSON).
/// A failed lookup yields the [`SENTINEL`] and logs a warning once per
/// (type, field) per run.
#[derive(Default)]
pub struct FieldAccessor {
    getters: HashMap<(String, String), Getter>,
    resolvers: HashMap<String, DynResolver>,
    warned: Mutex<HashSet<(String, String)>>,
}

impl FieldAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extraction closure for one field of a concrete type.
    pub fn register<T: Any>(
        &mut self,
        type_tag: impl Into<String>,
        field: impl Into<String>,
        get: impl Fn(&T) -> f64 + Send + Sync + 'static,
    ) {
        let getter: Getter = Arc::new(move |obj: &dyn Any| obj.downcast_ref::<T>().map(&get));
        self.getters
            .insert((type_tag.into(), field.into()), getter);
    }

    /// Register a fallback resolver for a type whose fields are not known
    /// statically. Exact getters registered for the same type win.
    pub fn register_dynamic(
        &mut self,
        type_tag: impl Into<String>,
        resolve: impl Fn(&dyn Any, &str) -> Option<f64> + Send + Sync + 'static,
    ) {
        self.resolvers.insert(type_tag.into(), Arc::new(resolve));
    }

    /// Extract `field` from `handle`, which was registered under
    /// `type_tag`. Returns the sentinel when the field cannot be resolved.
    pub fn get(&self, type_tag: &str, handle: &dyn Any, field: &str) -> f64 {
        if let Some(getter) = self
            .getters
            .get(&(type_tag.to_string(), field.to_string()))
            && let Some(value) = getter(handle)
        {
            return value;
        }
        if let Some(resolver) = self.resolvers.get(type_tag)
            && let Some(value) = resolver(handle, field)
        {
            return value;
        }
        self.warn_once(type_tag, field);
        SENTINEL
    }

    fn warn_once(&self, type_tag: &str, field: &str) {
        let mut warned = self.warned.lock().expect("accessor warn set poisoned");
        if warned.insert((type_tag.to_string(), field.to_string())) {
            log::warn!("unable to resolve field `{field}` on type `{type_tag}`");
        }
    }
}
