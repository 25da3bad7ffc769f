//! Inspection log API handlers
//!
//! Listing measurements by date prefix and fetching their camera images.

use crate::api::extract::{ApiJson, ApiPath};
use crate::db::models::LogEntry;
use crate::error::AppError;
use crate::services::ImageService;
use crate::state::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Log listing request
#[derive(Debug, Deserialize)]
pub struct LogRequest {
    /// Prefix of the stored timestamp, e.g. "2024-01" or "2024-01-05"
    #[serde(rename = "startDate")]
    pub start_date: String,
}

/// Both camera images of a measurement. Absent images serialize as `null`.
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    /// First camera image
    pub img1_base64: Option<String>,
    /// Second camera image
    pub img2_base64: Option<String>,
}

/// POST /api/logs - List measurements whose timestamp starts with `startDate`
pub async fn list_logs(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogRequest>,
) -> Result<Json<Vec<LogEntry>>, AppError> {
    let logs = state
        .db
        .list_measurements_by_date_prefix(&request.start_date)
        .await?;
    Ok(Json(logs))
}

/// GET /api/logs/:mid/images - Base64-encoded camera images of one measurement
pub async fn get_log_images(
    State(state): State<AppState>,
    ApiPath(mid): ApiPath<i64>,
) -> Result<Json<ImageResponse>, AppError> {
    let measurement = state
        .db
        .get_measurement(mid)
        .await?
        .ok_or(AppError::MeasurementNotFound(mid))?;

    let (img1_base64, img2_base64) = ImageService::encode_pair(
        measurement.cam1_path.as_deref(),
        measurement.cam2_path.as_deref(),
    )
    .await;

    Ok(Json(ImageResponse {
        img1_base64,
        img2_base64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewMeasurement, UNKNOWN_PRODUCT};
    use tempfile::tempdir;

    fn log_request(prefix: &str) -> LogRequest {
        LogRequest {
            start_date: prefix.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_logs_empty() {
        let state = AppState::for_tests().await;
        let response = list_logs(State(state), ApiJson(log_request("2024-01")))
            .await
            .unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_list_logs_filters_and_orders() {
        let state = AppState::for_tests().await;
        let product = state.db.insert_product("Gear").await.unwrap();
        for (measured_at, result) in [
            ("2023-12-31 23:59:59", Some("OK")),
            ("2024-01-02 08:00:00", Some("NG")),
            ("2024-01-15 12:00:00", None),
            ("2024-02-01 00:00:00", Some("OK")),
        ] {
            state
                .db
                .insert_measurement(&NewMeasurement {
                    product_id: Some(product),
                    measured_at: Some(measured_at.to_string()),
                    inspection_result: result.map(str::to_string),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let response = list_logs(State(state), ApiJson(log_request("2024-01")))
            .await
            .unwrap();
        assert_eq!(response.len(), 2);
        assert!(response.iter().all(|l| l.timestamp.starts_with("2024-01")));
        assert!(response[0].mid > response[1].mid);
        assert_eq!(response[0].result, "");
        assert_eq!(response[1].result, "NG");
        assert!(response.iter().all(|l| l.product_name == "Gear"));
    }

    #[tokio::test]
    async fn test_list_logs_unknown_product() {
        let state = AppState::for_tests().await;
        state
            .db
            .insert_measurement(&NewMeasurement {
                measured_at: Some("2024-05-01".to_string()),
                inspection_result: Some("OK".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let response = list_logs(State(state), ApiJson(log_request("2024-05")))
            .await
            .unwrap();
        assert_eq!(response[0].product_name, UNKNOWN_PRODUCT);
    }

    #[tokio::test]
    async fn test_get_log_images() {
        let state = AppState::for_tests().await;
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let cam2 = temp_dir.path().join("cam2.png");
        std::fs::write(&cam2, b"png").expect("Failed to write image");

        let mid = state
            .db
            .insert_measurement(&NewMeasurement {
                measured_at: Some("2024-01-01".to_string()),
                cam1_path: Some(temp_dir.path().join("missing.png").to_string_lossy().to_string()),
                cam2_path: Some(cam2.to_string_lossy().to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let response = get_log_images(State(state), ApiPath(mid)).await.unwrap();
        assert_eq!(response.img1_base64, None);
        assert_eq!(response.img2_base64.as_deref(), Some("cG5n"));
    }

    #[tokio::test]
    async fn test_get_log_images_not_found() {
        let state = AppState::for_tests().await;
        let result = get_log_images(State(state), ApiPath(999)).await;
        match result {
            Err(AppError::MeasurementNotFound(mid)) => assert_eq!(mid, 999),
            other => panic!("Expected MeasurementNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_request_and_response_shapes() {
        let request: LogRequest = serde_json::from_str(r#"{"startDate":"2024-01"}"#).unwrap();
        assert_eq!(request.start_date, "2024-01");

        let body = serde_json::to_value(ImageResponse {
            img1_base64: Some("AA==".to_string()),
            img2_base64: None,
        })
        .unwrap();
        assert_eq!(body["img1_base64"], "AA==");
        assert!(body["img2_base64"].is_null());
    }
}
