//! Heterogeneous device records.
//!
//! Records have no fixed schema. Fields are addressed by dotted paths such as
//! `DeviceProperties.DeviceID`; every segment is matched case-insensitively and
//! a missing or NULL parent yields `None` instead of an error.

pub mod value;

pub use value::FieldValue;

/// Read access to a loosely typed record
pub trait Record {
    /// Resolve a dotted field path.
    ///
    /// Returns `None` when any segment of the path is absent or when a parent
    /// container is not an object. An explicit NULL leaf is `Some(FieldValue::Null)`.
    fn try_get_field(&self, path: &str) -> Option<FieldValue>;
}

impl Record for serde_json::Value {
    fn try_get_field(&self, path: &str) -> Option<FieldValue> {
        path.split('.')
            .try_fold(self, |current, segment| json_member(current, segment))
            .map(FieldValue::from)
    }
}

impl Record for FieldValue {
    fn try_get_field(&self, path: &str) -> Option<FieldValue> {
        path.split('.')
            .try_fold(self, |current, segment| current.member(segment))
            .cloned()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn try_get_field(&self, path: &str) -> Option<FieldValue> {
        (**self).try_get_field(path)
    }
}

fn json_member<'a>(value: &'a serde_json::Value, name: &str) -> Option<&'a serde_json::Value> {
    let map = value.as_object()?;
    map.get(name).or_else(|| {
        let wanted = name.to_lowercase();
        map.iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, value)| value)
    })
}
