mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn summary_is_always_well_formed() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/calculations/summary", server.base_url))
        .bearer_auth(common::bearer_token("it-summary-user"))
        .send()
        .await?;

    // Degrades to a zeroed body without a database; never errors
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["total_assets"].is_number());
    assert!(body["total_liabilities"].is_number());
    assert!(body["net_worth"].is_number());
    Ok(())
}

#[tokio::test]
async fn monthly_echoes_the_requested_period() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/calculations/monthly?year=2024&month=12",
            server.base_url
        ))
        .bearer_auth(common::bearer_token("it-monthly-user"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["year"], 2024);
    assert_eq!(body["month"], 12);
    assert!(body["total_income"].is_number());
    assert!(body["total_expense"].is_number());
    Ok(())
}

#[tokio::test]
async fn monthly_rejects_out_of_range_months() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/calculations/monthly?month=13",
            server.base_url
        ))
        .bearer_auth(common::bearer_token("it-monthly-user"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn asset_creation_validates_before_touching_storage() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Non-positive amount fails validation regardless of database state
    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .bearer_auth(common::bearer_token("it-asset-user"))
        .json(&json!({ "type": "CASH", "name": "Checking", "amount": -100.0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["amount"].is_string());

    // Empty name likewise
    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .bearer_auth(common::bearer_token("it-asset-user"))
        .json(&json!({ "type": "CASH", "name": "", "amount": 100.0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn asset_creation_with_valid_input_succeeds_or_degrades() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .bearer_auth(common::bearer_token("it-asset-user"))
        .json(&json!({ "type": "CASH", "name": "Checking", "amount": 1000000.0 }))
        .send()
        .await?;

    // 201 with a database behind the server, 503 without; write paths
    // always surface the failure instead of silently dropping it
    assert!(
        res.status() == StatusCode::CREATED || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn family_group_creation_validates_the_name() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/family/groups", server.base_url))
        .bearer_auth(common::bearer_token("it-family-user"))
        .json(&json!({ "name": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn category_listings_are_public_and_always_arrays() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/categories?type=INCOME", "/api/categories/all"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "path: {}", path);
        let body = res.json::<serde_json::Value>().await?;
        assert!(body.is_array());
    }
    Ok(())
}
