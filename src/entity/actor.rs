use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{SqlParams, SqlResult};

use super::Row;

/// The authenticated caller, loaded once per request by the actor middleware.
///
/// `company_id` is resolved through the user's branch, not the user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub company_branch_id: Option<i64>,
    pub company_id: Option<i64>,
    /// Role carried by the token, e.g. `user` or `root`
    pub access: String,
}

impl Actor {
    pub fn new(id: i64, company_branch_id: Option<i64>, company_id: Option<i64>) -> Self {
        Self {
            id,
            company_branch_id,
            company_id,
            access: "user".to_string(),
        }
    }

    /// Active user joined to its branch, rendered as one `row`
    pub fn lookup_sql(user_id: i64) -> SqlResult {
        let mut params = SqlParams::new();
        let id = params.push(Value::from(user_id));
        SqlResult::new(
            format!(
                "SELECT jsonb_build_object('id', \"users\".\"id\", 'company_branch_id', \"users\".\"company_branch_id\", 'company_id', \"company_branches\".\"company_id\") AS row \
                 FROM \"users\" LEFT JOIN \"company_branches\" ON \"company_branches\".\"id\" = \"users\".\"company_branch_id\" \
                 WHERE \"users\".\"id\" = {} AND \"users\".\"deleted_at\" IS NULL",
                id
            ),
            params.into_values(),
        )
    }

    pub fn from_row(row: &Row, access: &str) -> Option<Self> {
        Some(Self {
            id: row.get("id")?.as_i64()?,
            company_branch_id: row.get("company_branch_id").and_then(Value::as_i64),
            company_id: row.get("company_id").and_then(Value::as_i64),
            access: access.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_row_tolerates_missing_branch() {
        let row: Row = serde_json::from_value(json!({ "id": 4, "company_branch_id": null, "company_id": null })).unwrap();
        let actor = Actor::from_row(&row, "admin").unwrap();
        assert_eq!(actor.company_branch_id, None);
        assert_eq!(actor.access, "admin");
        assert!(Actor::from_row(&Row::new(), "user").is_none());
    }
}
