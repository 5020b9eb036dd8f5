use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::DatasetService;
use crate::domain::error::{AppError, Result};
use crate::domain::records::{PageQuery, Record};
use crate::infrastructure::config::AppConfig;

pub struct HttpState {
    pub dataset: DatasetService,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    /// Comma-separated, ordered field filter.
    #[serde(default)]
    pub fields: Option<String>,
}

impl DetailQuery {
    fn filter_fields(&self) -> Vec<String> {
        self.fields
            .as_deref()
            .map(|fields| {
                fields
                    .split(',')
                    .map(|name| name.trim().to_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub data: Vec<String>,
    #[serde(rename = "numRecords")]
    pub count: usize,
}

#[derive(Serialize)]
pub struct RecordsResponse<'a> {
    pub data: &'a [Record],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

async fn detail(data: web::Data<HttpState>, query: web::Query<DetailQuery>) -> impl Responder {
    let filter = query.filter_fields();
    let schema = data.dataset.schema(&filter);
    debug!(filter = ?filter, fields = schema.fields.len(), "Schema query");

    HttpResponse::Ok().json(DetailResponse {
        data: schema.fields,
        count: schema.record_count,
    })
}

async fn records(data: web::Data<HttpState>, body: web::Bytes) -> HttpResponse {
    let query = match decode_page_query(&body) {
        Ok(query) => query,
        Err(err) => {
            warn!(error = %err, "Rejected page query");
            return error_response(&err);
        }
    };

    match data.dataset.page(&query) {
        Ok(page) => {
            debug!(
                offset = ?query.offset,
                limit = ?query.limit,
                returned = page.len(),
                "Page query"
            );
            HttpResponse::Ok().json(RecordsResponse { data: page })
        }
        Err(err) => {
            warn!(error = %err, offset = ?query.offset, limit = ?query.limit, "Rejected page query");
            error_response(&err)
        }
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse {
        error: "method not allowed".to_string(),
    })
}

/// A JSON `null` body is treated as an empty query.
fn decode_page_query(body: &[u8]) -> Result<PageQuery> {
    serde_json::from_slice::<Option<PageQuery>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|err| AppError::DecodeError(err.to_string()))
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    if !err.is_client_error() {
        return HttpResponse::InternalServerError().json(body);
    }
    match err {
        AppError::DecodeError(_) => HttpResponse::UnprocessableEntity().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Register `/detail` and `/records`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/detail")
            .route(web::get().to(detail))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/records")
            .route(web::post().to(records))
            .default_service(web::to(method_not_allowed)),
    );
}

pub fn start_server(dataset: DatasetService, config: &AppConfig) -> Result<Server> {
    let state = web::Data::new(HttpState { dataset });
    let cors_permissive = config.cors_permissive;

    let mut server = HttpServer::new(move || {
        let cors = if cors_permissive {
            Cors::permissive()
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let server = server.bind((config.host.as_str(), config.port))?.run();

    info!(
        host = %config.host,
        port = config.port,
        pagination = %config.pagination,
        "HTTP server listening"
    );

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{PaginationMode, RecordSet};
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn dataset(mode: PaginationMode) -> DatasetService {
        let records = ["alice", "bob", "carol", "dave"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut record = Record::new();
                record.insert("name".to_string(), name.to_string());
                record.insert("age".to_string(), (20 + i).to_string());
                if i == 0 {
                    record.insert("city".to_string(), "paris".to_string());
                }
                record
            })
            .collect();
        DatasetService::new(RecordSet::new(records), mode)
    }

    macro_rules! app {
        ($mode:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState {
                        dataset: dataset($mode),
                    }))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_detail_returns_sorted_fields_and_count() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::get().uri("/detail").to_request();
        let resp: DetailResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.data, vec!["age", "city", "name"]);
        assert_eq!(resp.count, 4);
    }

    #[actix_web::test]
    async fn test_detail_wire_format() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::get().uri("/detail").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["numRecords"], 4);
        assert!(body["data"].is_array());
    }

    #[actix_web::test]
    async fn test_detail_with_field_filter() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::get()
            .uri("/detail?fields=name,unknown,AGE")
            .to_request();
        let resp: DetailResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.data, vec!["name", "age"]);
    }

    #[actix_web::test]
    async fn test_detail_rejects_post() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::post().uri("/detail").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_records_page() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(serde_json::json!({"offset": 1, "limit": 3}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "bob");
        assert_eq!(data[1]["name"], "carol");
        assert!(data[0].get("city").is_none());
    }

    #[actix_web::test]
    async fn test_records_defaults_to_everything() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(serde_json::json!({}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"].as_array().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn test_records_count_mode() {
        let app = app!(PaginationMode::Count);
        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(serde_json::json!({"offset": 2, "limit": 1}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "carol");
    }

    #[actix_web::test]
    async fn test_records_range_error_is_bad_request() {
        let app = app!(PaginationMode::EndIndex);
        for payload in [
            serde_json::json!({"offset": -1}),
            serde_json::json!({"offset": 5}),
            serde_json::json!({"offset": 3, "limit": 2}),
        ] {
            let req = test::TestRequest::post()
                .uri("/records")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: ErrorResponse = test::read_body_json(resp).await;
            assert!(body.error.starts_with("Range error"));
        }
    }

    #[actix_web::test]
    async fn test_records_undecodable_body_is_unprocessable() {
        let app = app!(PaginationMode::EndIndex);
        for payload in ["", "not json", r#"{"offset": "one"}"#, r#"{"limit": 1e3}"#] {
            let req = test::TestRequest::post()
                .uri("/records")
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
        }
    }

    #[::core::prelude::v1::test]
    fn test_error_response_status_follows_error_kind() {
        let cases = [
            (AppError::DecodeError("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::RangeError("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ParseError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::IoError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status, "{err}");
        }
    }

    #[actix_web::test]
    async fn test_records_null_body_returns_everything() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::post()
            .uri("/records")
            .insert_header(("content-type", "application/json"))
            .set_payload("null")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(4));
    }

    #[actix_web::test]
    async fn test_records_rejects_get() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::get().uri("/records").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_bad_request_does_not_affect_later_requests() {
        let app = app!(PaginationMode::EndIndex);
        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(serde_json::json!({"offset": 99}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::get().uri("/detail").to_request();
        let resp: DetailResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.count, 4);
    }
}
