//! Router tests against the bundled demo artifacts

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use maintenance_predictor::model::ArtifactPaths;
use maintenance_predictor::{create_router, AppState, Config, InferenceService};

const HEADER: &str = "Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Torque [Nm],Tool wear [min]";

fn service() -> InferenceService {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/models");
    let paths = ArtifactPaths::new(format!("{}/scaler.json", dir), format!("{}/model.json", dir));
    tokio_test::assert_ok!(InferenceService::load(&paths))
}

fn app_with(config: Config) -> Router {
    create_router(AppState::new(service(), config))
}

fn app() -> Router {
    app_with(Config::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), disposition)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body, _) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body, _) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_csv(app: Router, uri: &str, csv: String) -> (StatusCode, Vec<u8>, Option<String>) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    send(app, request).await
}

fn scenario() -> Value {
    json!({
        "machine_type": "L",
        "air_temperature": 298.1,
        "process_temperature": 308.6,
        "rotational_speed": 1551,
        "torque": 42.8,
        "tool_wear": 0
    })
}

fn batch_csv(rows: &[&str]) -> String {
    let mut csv = format!("{}\n", HEADER);
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_index_lists_sections() {
    let (status, body) = get_json(app(), "/").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Home", "Single Prediction", "Batch Prediction", "Visual Insights", "About"]
    );
    assert_eq!(body["output_column"], "Failure_Prediction");
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = get_json(app(), "/api/v1/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["layout"]["feature_count"], 6);
    assert_eq!(body["metadata"]["scaler_kind"], "standard");
    assert_eq!(body["metadata"]["classifier_kind"], "logistic_regression");
    assert_eq!(body["status"]["model_loaded"], true);
}

#[tokio::test]
async fn test_predict_scenario_is_normal() {
    let (status, body) = post_json(app(), "/api/v1/predict", scenario()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["label"], "Normal");
    assert_eq!(body["record"]["machine_type"], "L");
    assert_eq!(body["message"], "Machine is operating normally.");
}

#[tokio::test]
async fn test_predict_worn_tool_fails() {
    let mut payload = scenario();
    payload["machine_type"] = json!("H");
    payload["torque"] = json!(70.0);
    payload["tool_wear"] = json!(240);

    let (status, body) = post_json(app(), "/api/v1/predict", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
    assert!(body["failure_probability"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_predict_accepts_numeric_strings() {
    let mut payload = scenario();
    payload["torque"] = json!("42.8");

    let (status, body) = post_json(app(), "/api/v1/predict", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["torque"], 42.8);
}

#[tokio::test]
async fn test_predict_unknown_type() {
    let mut payload = scenario();
    payload["machine_type"] = json!("X");

    let (status, body) = post_json(app(), "/api/v1/predict", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("'X'"));
}

#[tokio::test]
async fn test_predict_non_numeric_and_out_of_range() {
    let mut payload = scenario();
    payload["rotational_speed"] = json!("fast");
    let (status, body) = post_json(app(), "/api/v1/predict", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rotational_speed"));

    let mut payload = scenario();
    payload["torque"] = json!(-5.0);
    let (status, _) = post_json(app(), "/api/v1/predict", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_json_summary() {
    let csv = batch_csv(&[
        "L,298.1,308.6,1551,42.8,0",
        "H,298.1,308.6,1551,70,240",
        "M,298.2,308.7,1408,46.3,3",
    ]);

    let (status, body, _) = post_csv(app(), "/api/v1/predict/batch", csv).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["predicted_rows"], 3);
    assert_eq!(body["failure_count"], 1);
    assert_eq!(body["normal_count"], 2);
    assert!(body["batch_id"].is_string());
    assert_eq!(body["preview"]["columns"][6], "Failure_Prediction");
    assert_eq!(body["preview"]["rows"][1][6], "1");
}

#[tokio::test]
async fn test_batch_csv_download() {
    let csv = batch_csv(&["L,298.1,308.6,1551,42.8,0", "H,298.1,308.6,1551,70,240"]);

    let (status, body, disposition) =
        post_csv(app(), "/api/v1/predict/batch?format=csv&labels=true", csv).await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap().contains("predictions.csv"));

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("{},Failure_Prediction,Failure_Label", HEADER));
    assert_eq!(lines[1], "L,298.1,308.6,1551,42.8,0,0,Normal");
    assert_eq!(lines[2], "H,298.1,308.6,1551,70,240,1,Failure");
}

#[tokio::test]
async fn test_batch_missing_column() {
    let csv = "Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Tool wear [min]\nL,298.1,308.6,1551,0\n";

    let (status, body, _) = post_csv(app(), "/api/v1/predict/batch", csv.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Torque [Nm]"));
    assert_eq!(body["template"], "/api/v1/sample/template");
}

#[tokio::test]
async fn test_batch_bad_row() {
    let csv = batch_csv(&["L,298.1,308.6,1551,42.8,0", "X,298.1,308.6,1551,42.8,0"]);

    let (status, body, _) = post_csv(app(), "/api/v1/predict/batch", csv.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("row 2"));

    let (status, body, _) =
        post_csv(app(), "/api/v1/predict/batch?skip_invalid=true", csv).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["predicted_rows"], 1);
    assert_eq!(body["rejected"][0]["row"], 2);
}

#[tokio::test]
async fn test_batch_extra_columns_follow_config() {
    let csv = format!("UDI,{}\n1,L,298.1,308.6,1551,42.8,0\n", HEADER);

    let (status, _, _) = post_csv(app(), "/api/v1/predict/batch", csv.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let config = Config {
        batch_allow_extra_columns: true,
        ..Config::default()
    };
    let (status, body, _) =
        post_csv(app_with(config), "/api/v1/predict/batch?format=csv", csv).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert_eq!(text.lines().nth(1), Some("1,L,298.1,308.6,1551,42.8,0,0"));
}

const WORKBOOK: &[u8] = include_bytes!("fixtures/machines.xlsx");
const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

async fn post_xlsx(app: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, XLSX)
        .body(Body::from(WORKBOOK))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_batch_from_workbook() {
    let (status, body, disposition) = post_xlsx(app(), "/api/v1/predict/batch?format=csv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap().contains("predictions.csv"));

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("{},Failure_Prediction", HEADER));
    assert_eq!(lines[1], "L,298.1,308.6,1551,42.8,0,0");
    assert_eq!(lines[2], "H,298.1,308.6,1551,70,240,1");
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn test_insights_from_workbook() {
    let (status, body, _) = post_xlsx(app(), "/api/v1/insights").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["rows"], 3);
    assert_eq!(body["numeric_columns"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_csv_sent_as_workbook() {
    let request = Request::post("/api/v1/predict/batch")
        .header(header::CONTENT_TYPE, XLSX)
        .body(Body::from(batch_csv(&["L,298.1,308.6,1551,42.8,0"])))
        .unwrap();
    let (status, body, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["template"], "/api/v1/sample/template");
}

#[tokio::test]
async fn test_upload_limit() {
    let config = Config {
        max_upload_bytes: 64,
        ..Config::default()
    };
    let csv = batch_csv(&["L,298.1,308.6,1551,42.8,0"; 10]);

    let (status, body, _) = post_csv(app_with(config), "/api/v1/predict/batch", csv).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], 413);
}

#[tokio::test]
async fn test_insights() {
    let csv = format!(
        "{},Machine failure\nL,298.1,308.6,1551,42.8,0,0\nM,298.2,308.7,1408,46.3,3,0\nH,299.0,309.1,1300,70.1,230,1\n",
        HEADER
    );

    let (status, body, _) = post_csv(app(), "/api/v1/insights?bins=3", csv).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["rows"], 3);
    assert_eq!(body["failure_distribution"]["Failure"], 1);
    assert_eq!(body["failure_distribution"]["No Failure"], 2);
    assert_eq!(body["histograms"].as_array().unwrap().len(), 5);
    assert_eq!(body["histograms"][0]["counts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_insights_bin_limit() {
    let csv = batch_csv(&["L,298.1,308.6,1551,42.8,0", "M,298.2,308.7,1408,46.3,3"]);

    let (status, body, _) =
        post_csv(app(), "/api/v1/insights?bins=17179869184", csv.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("at most 200"));

    let (status, _, _) = post_csv(app(), "/api/v1/insights?bins=200", csv).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_insights_empty_upload() {
    let (status, _, _) = post_csv(app(), "/api/v1/insights", String::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sample_round_trips_through_batch() {
    let request = Request::get("/api/v1/sample?rows=25&seed=9").body(Body::empty()).unwrap();
    let (status, body, disposition) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap().contains("sample_data.csv"));

    let csv = String::from_utf8(body).unwrap();
    assert_eq!(csv.lines().count(), 26);

    let (status, body, _) = post_csv(app(), "/api/v1/predict/batch", csv).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["predicted_rows"], 25);
}

#[tokio::test]
async fn test_sample_row_limit() {
    let (status, _) = get_json(app(), "/api/v1/sample?rows=10001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_template() {
    let request = Request::get("/api/v1/sample/template").body(Body::empty()).unwrap();
    let (status, body, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert_eq!(text, format!("{}\nL,298.1,308.6,1551,42.8,0\n", HEADER));
}

#[tokio::test]
async fn test_counters_track_requests() {
    let state = AppState::new(service(), Config::default());
    let app = create_router(state.clone());

    post_json(app.clone(), "/api/v1/predict", scenario()).await;
    post_csv(
        app,
        "/api/v1/predict/batch",
        batch_csv(&["L,298.1,308.6,1551,42.8,0", "H,298.1,308.6,1551,70,240"]),
    )
    .await;

    let status = state.service.status();
    assert_eq!(status.predictions, 3);
    assert_eq!(status.failures_predicted, 1);
    assert_eq!(status.batches, 1);
}
