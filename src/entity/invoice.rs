use serde::Deserialize;
use serde_json::Value;

use super::{Actor, Row};

/// Invoice document as sent by the editor under the `invoice` key
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoicePayload {
    pub status: Value,
    pub heading: Value,
    pub reference_no_title: Value,
    pub reference_no_value: Value,
    pub created_date_title: Value,
    pub created_date_value: Value,
    pub expiry_date_title: Value,
    pub expiry_date_value: Value,
    pub sub_total_title: Value,
    pub sub_total_value: Value,
    pub grand_total_title: Value,
    pub grand_total_value: Value,
    pub invoice_to_title: Value,
    pub footer: Value,

    // Structured fields, stored as JSON text
    pub currency_type: Value,
    pub calculated_taxes: Value,
    pub customized_company_details: Value,
    pub customized_client_details: Value,
    pub table_columns: Value,
    pub items: Value,
    pub notes: Value,
    pub colors: Value,
}

/// What the invoice is attached to (`model` / `modelId`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trackable {
    pub model: Option<String>,
    pub model_id: Option<i64>,
}

impl InvoicePayload {
    /// Column values for an insert or update, owned by the actor's branch
    pub fn to_columns(&self, trackable: &Trackable, actor: &Actor) -> Result<Row, serde_json::Error> {
        let mut row = Row::new();
        for (column, value) in [
            ("status", &self.status),
            ("heading", &self.heading),
            ("reference_no_title", &self.reference_no_title),
            ("reference_no_value", &self.reference_no_value),
            ("created_date_title", &self.created_date_title),
            ("created_date_value", &self.created_date_value),
            ("expiry_date_title", &self.expiry_date_title),
            ("expiry_date_value", &self.expiry_date_value),
            ("sub_total_title", &self.sub_total_title),
            ("sub_total_value", &self.sub_total_value),
            ("grand_total_title", &self.grand_total_title),
            ("grand_total_value", &self.grand_total_value),
            ("invoice_to_title", &self.invoice_to_title),
            ("footer", &self.footer),
        ] {
            row.insert(column.to_string(), value.clone());
        }

        for (column, value) in [
            ("currency_type", &self.currency_type),
            ("calculated_taxes", &self.calculated_taxes),
            ("customized_company_details", &self.customized_company_details),
            ("customized_client_details", &self.customized_client_details),
            ("table_columns", &self.table_columns),
            ("items", &self.items),
            ("notes", &self.notes),
            ("colors", &self.colors),
        ] {
            row.insert(column.to_string(), Value::String(serde_json::to_string(value)?));
        }

        row.insert("client_id".to_string(), self.client_id().into());
        row.insert("trackable_type".to_string(), trackable.model.clone().into());
        row.insert("trackable_id".to_string(), trackable.model_id.into());
        row.insert("company_branch_id".to_string(), actor.company_branch_id.into());
        row.insert("company_id".to_string(), actor.company_id.into());
        Ok(row)
    }

    /// The billed client, taken from the customized client details
    pub fn client_id(&self) -> Option<i64> {
        match self.customized_client_details.get("id")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Invoice numbers are the row id, zero-padded to three digits
pub fn reference_number(id: i64) -> String {
    format!("{:03}", id)
}
