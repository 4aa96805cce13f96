pub mod index;
pub mod lifecycle;
pub mod record;
pub mod relations;

pub use index::{index, lifecycle_stages};
pub use lifecycle::{get as lifecycle, put as update_lifecycle};
pub use record::{delete as destroy, get as show, post as store, put as update};
pub use relations::{contractors, remove_client, remove_contractor};

use serde_json::Value;

/// Empty the way form input is empty: null, blank text, `0`, `false` or an empty collection
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty() || s == "0",
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}
