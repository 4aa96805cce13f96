use serde_json::Value;

use super::{Actor, Row};

/// Columns a caller may set on a jobcard
pub const FILLABLE: &[&str] = &[
    "title", "description", "start_date", "end_date", "priority", "cost_center", "client_id",
];

/// Keep only fillable columns from a request body. Ownership columns are
/// never taken from the body.
pub fn fillable_columns(body: &Value) -> Row {
    let mut row = Row::new();
    if let Value::Object(map) = body {
        for column in FILLABLE {
            if let Some(value) = map.get(*column) {
                row.insert(column.to_string(), value.clone());
            }
        }
    }
    row
}

/// Columns for a new jobcard, owned by the actor's branch
pub fn new_jobcard(body: &Value, actor: &Actor) -> Result<Row, &'static str> {
    let mut row = fillable_columns(body);
    match row.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        _ => return Err("The title field is required"),
    }
    row.insert("company_branch_id".to_string(), actor.company_branch_id.into());
    row.insert("company_id".to_string(), actor.company_id.into());
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ownership_is_taken_from_actor() {
        let body = json!({ "title": "Fix roof", "company_id": 99, "priority": 2 });
        let row = new_jobcard(&body, &Actor::new(1, Some(3), Some(2))).unwrap();
        assert_eq!(row["company_id"], json!(2));
        assert_eq!(row["priority"], json!(2));
    }

    #[test]
    fn title_is_required() {
        assert!(new_jobcard(&json!({ "title": "  " }), &Actor::new(1, Some(3), Some(2))).is_err());
    }
}
