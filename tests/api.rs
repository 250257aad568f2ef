//! HTTP-level tests driving the full router over the in-memory store.

mod common;

use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use common::{body_json, body_text, food_body, TestApp};
use serde_json::{json, Value};

async fn create_food(app: &TestApp, token: &str, name: &str, serving_size: f64) -> Value {
    let response = app.post_json("/api/v1/foods", token, food_body(name, serving_size)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn log_entry(app: &TestApp, token: &str, food_id: &str, quantity: f64, date: &str, meal: &str) -> Value {
    let body = json!({
        "food_id": food_id,
        "quantity": quantity,
        "entry_date": date,
        "meal_type": meal,
    });
    let response = app.post_json("/api/v1/entries", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().map_or(false, |v| (v - expected).abs() < 1e-9)
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn requests_without_valid_token_are_unauthenticated() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/api/v1/foods", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");

    let response = app.get("/api/v1/foods", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foods_are_private_to_their_owner() {
    let app = TestApp::new();
    let (_, alice) = app.user();
    let (_, bob) = app.user();

    let food = create_food(&app, &alice, "Chicken breast", 100.0).await;
    let uri = format!("/api/v1/foods/{}", food["id"].as_str().unwrap());

    let response = app.get(&uri, &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Chicken breast");

    let response = app.get(&uri, &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let listed = body_json(app.get("/api/v1/foods", &bob).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_food_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let response = app.post_json("/api/v1/foods", &token, food_body("  ", 100.0)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");

    let response = app.post_json("/api/v1/foods", &token, food_body("Rice", -1.0)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recent_order_puts_last_logged_food_first() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let apple = create_food(&app, &token, "Apple", 100.0).await;
    create_food(&app, &token, "Banana", 100.0).await;
    log_entry(&app, &token, apple["id"].as_str().unwrap(), 1.0, "2024-03-01", "snack").await;

    let by_name = body_json(app.get("/api/v1/foods", &token).await).await;
    assert_eq!(by_name[0]["name"], "Apple");
    assert_eq!(by_name[1]["name"], "Banana");

    let recent = body_json(app.get("/api/v1/foods?order=recent", &token).await).await;
    assert_eq!(recent[0]["name"], "Apple");
}

#[tokio::test]
async fn entry_lifecycle() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let (_, other) = app.user();
    let food = create_food(&app, &token, "Chicken breast", 100.0).await;
    let food_id = food["id"].as_str().unwrap();

    let entry = log_entry(&app, &token, food_id, 2.0, "2024-03-01", "lunch").await;
    let entry_uri = format!("/api/v1/entries/{}", entry["id"].as_str().unwrap());
    assert_eq!(entry["entry_date"], "2024-03-01");

    let zero = json!({"food_id": food_id, "quantity": 0, "entry_date": "2024-03-01", "meal_type": "lunch"});
    let response = app.post_json("/api/v1/entries", &token, zero).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let foreign = json!({"food_id": food_id, "quantity": 1, "entry_date": "2024-03-01", "meal_type": "lunch"});
    let response = app.post_json("/api/v1/entries", &other, foreign.clone()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.put_json(&entry_uri, &other, foreign).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let edit = json!({"food_id": food_id, "quantity": 1.5, "entry_date": "2024-03-02", "meal_type": "dinner", "note": "seconds"});
    let response = app.put_json(&entry_uri, &token, edit).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["meal_type"], "dinner");
    assert_eq!(updated["note"], "seconds");

    let day = body_json(app.get("/api/v1/entries?date=2024-03-02", &token).await).await;
    assert_eq!(day.as_array().unwrap().len(), 1);
    let range = body_json(app.get("/api/v1/entries?from=2024-02-01&to=2024-03-01", &token).await).await;
    assert_eq!(range.as_array().unwrap().len(), 0);
    let response = app.get("/api/v1/entries", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(Method::DELETE, &entry_uri, Some(&other), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.send(Method::DELETE, &entry_uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.send(Method::DELETE, &entry_uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serving_size_edit_then_confirmed_rescale() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let food = create_food(&app, &token, "Granola", 100.0).await;
    let food_id = food["id"].as_str().unwrap();
    log_entry(&app, &token, food_id, 3.0, "2024-03-01", "breakfast").await;

    let food_uri = format!("/api/v1/foods/{food_id}");
    let response = app.put_json(&food_uri, &token, food_body("Granola", 30.0)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["serving_size_change"], json!({"previous": 100.0, "next": 30.0}));

    // nothing is rewritten until the client confirms
    let entries = body_json(app.get(&format!("{food_uri}/entries"), &token).await).await;
    assert!(approx(&entries[0]["quantity"], 3.0));

    let body = json!({"previous_serving_size": 100.0, "next_serving_size": 30.0});
    let response = app.post_json(&format!("{food_uri}/rescale-entries"), &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rescaled"], 1);

    let entries = body_json(app.get(&format!("{food_uri}/entries"), &token).await).await;
    assert!(approx(&entries[0]["quantity"], 10.0));

    let back = json!({"previous_serving_size": 30.0, "next_serving_size": 100.0});
    let response = app.post_json(&format!("{food_uri}/rescale-entries"), &token, back).await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(app.get(&format!("{food_uri}/entries"), &token).await).await;
    assert!(approx(&entries[0]["quantity"], 3.0));

    let extreme = json!({"previous_serving_size": 1e-300, "next_serving_size": 1e300});
    let response = app.post_json(&format!("{food_uri}/rescale-entries"), &token, extreme).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn goals_are_versioned_by_start_date() {
    let app = TestApp::new();
    let (_, token) = app.user();

    let replace = json!({"mode": "replace", "targets": {"kind": "daily", "calories": 2000, "protein": 150}});
    let response = app.put_json("/api/v1/goals/2024-01-01", &token, replace).await;
    assert_eq!(response.status(), StatusCode::OK);

    let per_meal = json!({
        "mode": "replace",
        "targets": {
            "kind": "per_meal",
            "breakfast": {"calories": 500},
            "lunch": {"calories": 700},
            "dinner": {"calories": 600, "protein": 50}
        }
    });
    app.put_json("/api/v1/goals/2024-02-01", &token, per_meal).await;

    let january = body_json(app.get("/api/v1/goals/effective?date=2024-01-31", &token).await).await;
    assert_eq!(january["goal"]["starts_on"], "2024-01-01");
    assert_eq!(january["daily"]["calories"], 2000.0);

    let february = body_json(app.get("/api/v1/goals/effective?date=2024-02-10", &token).await).await;
    assert_eq!(february["daily"]["calories"], 1800.0);
    assert_eq!(february["daily"]["protein"], 50.0);

    let before = body_json(app.get("/api/v1/goals/effective?date=2023-12-31", &token).await).await;
    assert!(before["goal"].is_null());

    let patch = json!({
        "mode": "patch",
        "targets": {
            "kind": "daily",
            "calories": {"op": "set", "value": 2100},
            "protein": {"op": "leave"},
            "fat": {"op": "leave"},
            "carbs": {"op": "leave"},
            "fiber": {"op": "leave"}
        }
    });
    let response = app.put_json("/api/v1/goals/2024-02-01", &token, patch.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = app.put_json("/api/v1/goals/2024-01-01", &token, patch).await;
    assert_eq!(response.status(), StatusCode::OK);

    let history = body_json(app.get("/api/v1/goals", &token).await).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["targets"]["calories"], 2100.0);
    assert_eq!(history[0]["targets"]["protein"], 150.0);

    let response = app.put_json("/api/v1/goals/2024-1-1", &token, json!({"mode": "replace", "targets": {"kind": "daily"}})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn day_summary_reports_progress() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let food = create_food(&app, &token, "Chicken breast", 100.0).await;
    let food_id = food["id"].as_str().unwrap();
    log_entry(&app, &token, food_id, 2.0, "2024-03-01", "lunch").await;
    log_entry(&app, &token, food_id, 1.0, "2024-03-02", "lunch").await;

    let goal = json!({"mode": "replace", "targets": {"kind": "daily", "protein": 62}});
    app.put_json("/api/v1/goals/2024-03-01", &token, goal).await;

    let summary = body_json(app.get("/api/v1/days/2024-03-01/summary", &token).await).await;
    assert!(approx(&summary["totals"]["calories"], 330.0));
    let protein = summary["progress"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["nutrient"] == "protein")
        .unwrap();
    assert!(approx(&protein["percent"], 100.0));
    assert_eq!(protein["status"], "on_target");

    let calories = summary["progress"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["nutrient"] == "calories")
        .unwrap();
    assert!(calories["percent"].is_null());

    let view = body_json(app.get("/api/v1/days/2024-03-01", &token).await).await;
    assert_eq!(view["meals"][1]["meal_type"], "lunch");
    assert_eq!(view["meals"][1]["entries"][0]["food_label"], "Chicken breast");

    let response = app.get("/api/v1/days/March-1/summary", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_returns_markdown() {
    let app = TestApp::new();
    let (_, token) = app.user();
    let food = create_food(&app, &token, "Chicken breast", 100.0).await;
    log_entry(&app, &token, food["id"].as_str().unwrap(), 2.0, "2024-03-01", "lunch").await;

    let response = app
        .get("/api/v1/export?from=2024-03-01&to=2024-03-07&nutrients=calories,protein", &token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/markdown"));
    let markdown = body_text(response).await;
    assert!(markdown.starts_with("# Food Export"));
    assert!(markdown.contains("**Nutritional Information:** Calories, Protein"));
    assert!(markdown.contains("- **Chicken breast** - 200g (330Cal Calories, 62g Protein)"));
}

#[tokio::test]
async fn public_food_search_and_import() {
    let app = TestApp::new();
    let (user_id, token) = app.user();

    let blank = body_json(app.get("/api/v1/public-foods?query=%20", &token).await).await;
    assert_eq!(blank["foods"].as_array().unwrap().len(), 0);

    let found = body_json(app.get("/api/v1/public-foods?query=oat", &token).await).await;
    assert_eq!(found["foods"][0]["name"], "Oats");

    let drafts = json!({"drafts": [found["foods"][0], {"name": "Rolled oats", "brand": "Mill"}]});
    let response = app.post_json("/api/v1/foods/import", &token, drafts).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let food = body_json(response).await;
    assert_eq!(food["name"], "Oats");
    assert_eq!(food["brand"], "Mill");
    assert_eq!(food["user_id"], user_id.to_string());

    let incomplete = json!({"drafts": [{"name": "Mystery bar"}]});
    let response = app.post_json("/api/v1/foods/import", &token, incomplete).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("serving_size"));
}
