//! Element → datum side table.
//!
//! The scene layer binds each element to a JSON datum here instead of hanging
//! it off the element itself. Controllers receive the table explicitly and
//! re-read it on every event, so a datum bound after registration is still
//! seen and a removed datum is simply absent.

#[cfg(test)]
#[path = "datum_test.rs"]
mod datum_test;

use std::collections::HashMap;

use serde_json::Value;

use crate::surface::ElementId;

/// Datum fields a physics engine reads as the node's simulated position.
pub const FIELD_X: &str = "x";
pub const FIELD_Y: &str = "y";

/// Datum fields a physics engine treats as a fixed (pinned) position.
pub const FIELD_FX: &str = "fx";
pub const FIELD_FY: &str = "fy";

/// Data bound to scene elements.
#[derive(Debug, Clone, Default)]
pub struct DatumTable {
    entries: HashMap<ElementId, Value>,
}

impl DatumTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind) a datum to an element.
    pub fn bind(&mut self, el: ElementId, datum: Value) {
        self.entries.insert(el, datum);
    }

    /// Remove an element's datum, returning it.
    pub fn unbind(&mut self, el: ElementId) -> Option<Value> {
        self.entries.remove(&el)
    }

    #[must_use]
    pub fn get(&self, el: ElementId) -> Option<&Value> {
        self.entries.get(&el)
    }

    pub fn get_mut(&mut self, el: ElementId) -> Option<&mut Value> {
        self.entries.get_mut(&el)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the object holding position fields: the datum itself, or the
/// object stored under `wrapper` for nested bindings.
pub fn position_target<'a>(datum: &'a mut Value, wrapper: Option<&str>) -> Option<&'a mut serde_json::Map<String, Value>> {
    let target = match wrapper {
        Some(field) => datum.get_mut(field)?,
        None => datum,
    };
    target.as_object_mut()
}

/// Read a numeric field; absent or non-numeric fields read as `None`.
#[must_use]
pub fn number_field(obj: &serde_json::Map<String, Value>, field: &str) -> Option<f64> {
    obj.get(field).and_then(Value::as_f64)
}
