use crate::dedup::{detect_duplicates, DetectionOptions, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SIMILARITY};
use crate::store::CenterStore;
use center_dedup_service::auth::{authenticate, require_role, ADMIN_ROLES};
use center_dedup_service::config::Settings;
use center_dedup_service::dto::{ApiGatewayRequest, DetectionQuery};
use center_dedup_service::error::ServiceError;
use center_dedup_service::response::{make_preflight_payload, make_response_payload};
use chrono::Utc;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

///
/// Entry point for one proxy event: answers CORS preflight, rejects other
/// methods and runs duplicate detection for GET.
///
pub async fn route<S: CenterStore>(
    request: &ApiGatewayRequest,
    store: &S,
    settings: &Settings,
) -> Result<Value, lambda_runtime::Error> {
    let result = match request.http_method.to_ascii_uppercase().as_str() {
        "OPTIONS" => return make_preflight_payload(),
        "GET" => detect(request, store, settings).await,
        method => Err(ServiceError::method_not_allowed(format!(
            "Method {} is not supported",
            method
        ))),
    };
    if let Err(err) = &result {
        warn!(status = err.status.code(), message = %err.msg, "Request failed");
    }
    make_response_payload(result, settings.expose_error_details())
}

async fn detect<S: CenterStore>(
    request: &ApiGatewayRequest,
    store: &S,
    settings: &Settings,
) -> Result<Value, ServiceError> {
    let user = authenticate(request, &settings.jwt_secret)?;
    require_role(&user, ADMIN_ROLES)?;
    let query = parse_query(request)?;

    let start = Instant::now();
    let centers = store
        .fetch_active_centers(&query.filters())
        .await
        .map_err(|err| {
            let details = err.details.unwrap_or(err.msg);
            ServiceError::internal_server_error("Failed to load centers").with_details(details)
        })?;
    info!(
        centers = centers.len(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Loaded active centers"
    );

    let start = Instant::now();
    let options = DetectionOptions {
        min_similarity: query.min_similarity,
        max_results: query.max_results,
    };
    let report = detect_duplicates(&centers, &options);
    info!(
        groups = report.summary.total_groups,
        centers = report.summary.total_centers,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Duplicate detection completed"
    );

    Ok(json!({
        "success": true,
        "data": {
            "duplicates": report.duplicates,
            "summary": report.summary,
            "filters": query,
        },
        "user": user,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn text_param(request: &ApiGatewayRequest, name: &str) -> Option<String> {
    request
        .query_param(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn number_param<T: FromStr>(
    request: &ApiGatewayRequest,
    name: &str,
    default: T,
) -> Result<T, ServiceError> {
    match text_param(request, name) {
        Some(value) => value
            .parse()
            .map_err(|_| ServiceError::bad_request(format!("Invalid {} '{}'", name, value))),
        None => Ok(default),
    }
}

fn parse_query(request: &ApiGatewayRequest) -> Result<DetectionQuery, ServiceError> {
    let min_similarity: u8 = number_param(request, "minSimilarity", DEFAULT_MIN_SIMILARITY)?;
    if min_similarity > 100 {
        return Err(ServiceError::bad_request(
            "minSimilarity must be between 0 and 100",
        ));
    }
    let max_results: usize = number_param(request, "maxResults", DEFAULT_MAX_RESULTS)?;
    if max_results == 0 {
        return Err(ServiceError::bad_request("maxResults must be at least 1"));
    }
    Ok(DetectionQuery {
        state: text_param(request, "state"),
        lga: text_param(request, "lga"),
        min_similarity,
        max_results,
    })
}
