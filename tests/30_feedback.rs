mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use alert_feedback_api::store::{DocumentId, Filter, Projection};

#[tokio::test]
async fn feedback_is_stored_and_acknowledged() -> Result<()> {
    let server = common::spawn_server().await?;
    let alert_id = common::insert_alert(&server.store, "Spike", vec![]).await?;

    let res = server
        .client
        .post(server.url("/api/feedback/"))
        .json(&json!({
            "alert_id": alert_id.to_string(),
            "alert_message": "Spike",
            "rating": 4,
            "comment": "Looks right",
            "is_correct": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "Feedback submitted successfully");

    let id: DocumentId = body["data"]["id"].as_str().unwrap_or_default().parse()?;
    let stored = server
        .store
        .feedback()
        .find_one(&Filter::ById(id), &Projection::none())
        .await?
        .expect("feedback document stored");

    assert_eq!(stored["alertId"], alert_id.to_string());
    assert_eq!(stored["alertMessage"], "Spike");
    assert_eq!(stored["rating"], 4);
    assert_eq!(stored["comment"], "Looks right");
    assert_eq!(stored["isCorrect"], true);
    assert!(stored["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    Ok(())
}

#[tokio::test]
async fn feedback_defaults_optional_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let alert_id = DocumentId::new();

    let res = server
        .client
        .post(server.url("/api/feedback/"))
        .json(&json!({ "alert_id": alert_id.to_string() }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    let id: DocumentId = body["data"]["id"].as_str().unwrap_or_default().parse()?;
    let stored = server
        .store
        .feedback()
        .find_one(&Filter::ById(id), &Projection::none())
        .await?
        .expect("feedback document stored");

    assert_eq!(stored["rating"], 0);
    assert_eq!(stored["comment"], "");
    assert_eq!(stored["alertMessage"], "");
    Ok(())
}

#[tokio::test]
async fn malformed_alert_id_is_400() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/feedback/"))
        .json(&json!({ "alert_id": "nope", "rating": 2 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "error");
    assert!(body["field_errors"]["alert_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn invalid_json_is_400() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/feedback/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
