use std::{
    fmt, io,
    sync::{Arc, Mutex},
};

use actix_cors::Cors;
use actix_web::{
    get,
    http::{header, StatusCode},
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder, ResponseError,
};
use anyhow::{anyhow, Context};
use chrono::Utc;
use common::req::DataSource;
use log::{error, info};

use crate::aggregate::Aggregator;
use crate::config::Config;
use crate::db::Db;
use crate::sample::{Order, SampleQuery, SampleStore};
use crate::snapshot::{self, EmptyOutdoor};

/// Any failure behind an endpoint. Answers 500 without a body.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!("Request failed: {self}");
        HttpResponse::build(self.status_code()).finish()
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

fn poisoned<T>(_: T) -> ApiError {
    ApiError(anyhow!("sample store lock poisoned"))
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("weather backend")
}

async fn api_weather<S: SampleStore + 'static>(
    store: web::Data<Arc<Mutex<S>>>,
    policy: web::Data<EmptyOutdoor>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let snapshot = {
        let mut store = store.lock().map_err(poisoned)?;
        let mut aggregator = Aggregator::new(&mut *store);
        snapshot::collect(&mut aggregator, now, **policy)?
    };

    match snapshot {
        Some(snapshot) => {
            let body = serde_json::to_string(&snapshot).context("failed to encode snapshot")?;
            Ok(HttpResponse::Ok()
                .content_type(header::ContentType::json())
                .body(body))
        }
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

#[derive(serde::Deserialize, Debug)]
struct SamplesParams {
    source: DataSource,
    from: Option<i64>,
    before: Option<i64>,
    #[serde(default)]
    order: Order,
    limit: Option<i64>,
}

async fn api_samples<S: SampleStore + 'static>(
    params: web::Query<SamplesParams>,
    store: web::Data<Arc<Mutex<S>>>,
) -> Result<impl Responder, ApiError> {
    let query = SampleQuery {
        source: params.source,
        from: params.from,
        before: params.before,
        order: params.order,
        limit: params.limit,
    };
    let res = store.lock().map_err(poisoned)?.query(&query)?;
    Ok(web::Json(res))
}

/// Registers all endpoints for a store of type `S`.
pub fn configure<S: SampleStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .route("/api/weather", web::get().to(api_weather::<S>))
        .route("/api/samples", web::get().to(api_samples::<S>));
}

pub async fn new_http_server(db: Arc<Mutex<Db>>, config: &Config) -> io::Result<()> {
    let policy = config.empty_outdoor;
    let origin = config.cors_origin.clone();

    info!("Serving weather on http://{}", config.http_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(policy))
            .configure(configure::<Db>)
            .wrap(
                Cors::default()
                    .allowed_origin(&origin)
                    .allowed_methods(vec!["GET"])
                    .allowed_headers(vec![header::ACCEPT])
                    .allowed_header(header::CONTENT_TYPE)
                    .max_age(3600),
            )
    })
    .bind(config.http_addr)?
    .run()
    .await
}
