mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::ScriptedStore;

const INVOICE_ROWS: &str = "SELECT to_jsonb(\"invoices\".*) AS row";

fn invoice_body() -> serde_json::Value {
    json!({
        "model": "jobcard",
        "modelId": "9",
        "invoice": {
            "status": "draft",
            "heading": "Invoice",
            "reference_no_value": "",
            "items": [{ "name": "Paint", "qty": 2 }],
            "customized_client_details": { "id": 5, "name": "Acme" }
        }
    })
}

#[tokio::test]
async fn create_numbers_the_invoice_and_reloads_it() -> Result<()> {
    let store = ScriptedStore::with_actor();
    store.rows("INSERT INTO \"invoices\"", json!([{ "id": 7 }]));
    store.rows(INVOICE_ROWS, json!([{ "id": 7, "reference_no_value": "007", "items": "[{\"name\":\"Paint\",\"qty\":2}]" }]));

    let (status, body) =
        common::send(common::app(store.clone()), Method::POST, "/api/invoices", Some(invoice_body())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reference_no_value"], "007");

    let insert = store.find("INSERT INTO \"invoices\"").expect("insert");
    let document = &insert.params[0];
    assert_eq!(document["items"], "[{\"name\":\"Paint\",\"qty\":2}]");
    assert_eq!(document["client_id"], 5);
    assert_eq!(document["trackable_type"], "jobcard");
    assert_eq!(document["trackable_id"], 9);
    assert_eq!(document["company_branch_id"], 3);
    assert_eq!(document["company_id"], 2);

    let numbering = store.find("UPDATE \"invoices\"").expect("reference number update");
    assert_eq!(numbering.params[0]["reference_no_value"], "007");
    assert_eq!(numbering.params[1], json!(7));

    let kinds: Vec<_> = store
        .statements()
        .into_iter()
        .filter(|s| s.query.starts_with("INSERT INTO \"recent_activities\""))
        .map(|s| s.params[0]["type"].clone())
        .collect();
    assert_eq!(kinds, vec![json!("created"), json!("authourized")]);
    Ok(())
}

#[tokio::test]
async fn failed_insert_records_a_failure() -> Result<()> {
    let store = ScriptedStore::with_actor();
    store.fail("INSERT INTO \"invoices\"", "null value in column \"heading\"");

    let (status, body) =
        common::send(common::app(store.clone()), Method::POST, "/api/invoices", Some(invoice_body())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Query Error");

    let activity = store.find("INSERT INTO \"recent_activities\"").expect("failure activity");
    assert_eq!(activity.params[0]["type"], "fail");
    assert_eq!(activity.params[0]["activity"]["message"], "invoice creation failed");
    Ok(())
}

#[tokio::test]
async fn create_without_invoice_is_unprocessable() -> Result<()> {
    let store = ScriptedStore::with_actor();
    let (status, _) =
        common::send(common::app(store.clone()), Method::POST, "/api/invoices", Some(json!({ "model": "jobcard" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.find("INSERT").is_none());
    Ok(())
}

#[tokio::test]
async fn unmapped_model_lists_nothing() -> Result<()> {
    let store = ScriptedStore::with_actor();
    let (status, body) = common::get(common::app(store.clone()), "/api/invoices?model=client").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["data"], json!([]));
    assert!(store.handler_statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_invoice_is_no_resource() -> Result<()> {
    let store = ScriptedStore::with_actor();
    store.affected("UPDATE \"invoices\"", 0);
    let (status, body) =
        common::send(common::app(store), Method::PUT, "/api/invoices/40", Some(invoice_body())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No resource found");
    Ok(())
}

#[tokio::test]
async fn update_leaves_trashed_invoices_alone() -> Result<()> {
    let store = ScriptedStore::with_actor();
    store.affected("UPDATE \"invoices\"", 0);
    let (status, _) =
        common::send(common::app(store.clone()), Method::PUT, "/api/invoices/41", Some(invoice_body())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let update = store.find("UPDATE \"invoices\"").expect("update statement");
    assert!(update.query.ends_with("WHERE \"invoices\".\"id\" = $2 AND \"invoices\".\"deleted_at\" IS NULL"));
    assert_eq!(update.params[1], json!(41));
    Ok(())
}
