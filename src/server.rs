use std::sync::Arc;

use axum::{
  Extension, Json, Router,
  routing::{get, post},
};
use clap::Parser;
use http::StatusCode;
use tower_http::compression::CompressionLayer;
use tracing::{debug, info, warn};

use crate::{
  config::SkillConfig,
  envelope::{RequestEnvelope, ResponseEnvelope},
  error::{ConfigError, ForeignApplication, Result, into_http},
  skill::Dispatcher,
};

#[derive(Parser)]
pub struct ServerConfig {
  #[clap(long, short, env = "BIND", default_value = "127.0.0.1:4080")]
  bind: String,
  /// Path the voice platform posts requests to
  #[clap(long, default_value = "/")]
  path: String,
}

#[derive(Clone)]
pub struct SkillService {
  dispatcher: Dispatcher,
  skill_id: Arc<str>,
}

impl SkillService {
  pub fn new(dispatcher: Dispatcher, skill_id: &str) -> Self {
    Self {
      dispatcher,
      skill_id: skill_id.trim().into(),
    }
  }

  fn check_application(
    &self,
    envelope: &RequestEnvelope,
  ) -> Result<(), ForeignApplication> {
    match envelope.application_id() {
      Some(id) if id == &*self.skill_id => Ok(()),
      other => Err(ForeignApplication(other.map(str::to_string))),
    }
  }
}

pub fn router(service: SkillService, path: &str) -> Router {
  Router::new()
    .route(path, post(handle_skill_request))
    .route("/health", get(|| async { "ok" }))
    .fallback(|| async { (StatusCode::NOT_FOUND, "Endpoint not found") })
    .layer(Extension(service))
    .layer(CompressionLayer::new().gzip(true))
}

async fn handle_skill_request(
  Extension(service): Extension<SkillService>,
  Json(envelope): Json<RequestEnvelope>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, String)> {
  if let Err(e) = service.check_application(&envelope) {
    warn!("rejecting request {:?}: {e}", envelope.request_id());
    return Err(into_http(e.into()));
  }

  debug!(
    "request {:?} (envelope version {:?})",
    envelope.request_id(),
    envelope.version
  );
  let req = envelope.into_intent_request();
  let resp = service.dispatcher.dispatch(&req).await;
  Ok(Json(resp.into()))
}

pub async fn serve(
  server_config: ServerConfig,
  skill_config: &SkillConfig,
  dispatcher: Dispatcher,
) -> Result<()> {
  if !server_config.path.starts_with('/') {
    return Err(
      ConfigError::Invalid {
        name: "path",
        reason: format!("{:?} must start with /", server_config.path),
      }
      .into(),
    );
  }

  info!("listening on {}", server_config.bind);
  let listener = tokio::net::TcpListener::bind(&server_config.bind).await?;

  let service = SkillService::new(dispatcher, &skill_config.skill_id);
  info!(
    "serving skill {} at {} (feed: {})",
    skill_config.skill_id, server_config.path, skill_config.feed_url
  );
  let app = router(service, &server_config.path);

  info!("starting server");
  Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod test {
  use axum::body::Body;
  use serde_json::json;
  use tower::ServiceExt;

  use super::*;
  use crate::envelope::test::{SKILL_ID, intent_request_json};
  use crate::skill::test::fixture_dispatcher;

  fn app() -> Router {
    router(SkillService::new(fixture_dispatcher(), SKILL_ID), "/")
  }

  fn post_json(body: String) -> http::Request<Body> {
    http::Request::builder()
      .method("POST")
      .uri("/")
      .header("content-type", "application/json")
      .body(Body::from(body))
      .unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn test_read_items_from_date() {
    let body = intent_request_json(
      "ReadItemsFromDate",
      json!({ "newsDate": { "name": "newsDate", "value": "2024-01-10" } }),
    );
    let resp = app().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let value = body_json(resp).await;
    let ssml = value["response"]["outputSpeech"]["ssml"].as_str().unwrap();
    assert!(
      ssml.starts_with("<speak>Here are the Azure news items from 2024-01-10.")
    );
    assert!(ssml.contains("Zone-redundant storage for disks"));
    assert_eq!(value["response"]["shouldEndSession"], json!(false));
  }

  #[tokio::test]
  async fn test_stop_ends_session() {
    let body = intent_request_json("AMAZON.StopIntent", json!({}));
    let resp = app().oneshot(post_json(body.to_string())).await.unwrap();

    let value = body_json(resp).await;
    assert_eq!(
      value["response"]["outputSpeech"]["ssml"],
      json!("<speak>Goodbye!</speak>")
    );
    assert_eq!(value["response"]["shouldEndSession"], json!(true));
  }

  #[tokio::test]
  async fn test_unknown_intent_apologizes() {
    let body = intent_request_json("OrderPizza", json!({}));
    let resp = app().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let value = body_json(resp).await;
    let ssml = value["response"]["outputSpeech"]["ssml"].as_str().unwrap();
    assert!(ssml.contains("Sorry, I had trouble doing what you asked."));
    assert!(value["response"]["reprompt"].is_object());
  }

  #[tokio::test]
  async fn test_rejects_foreign_application() {
    let mut body = intent_request_json("ReadTopFive", json!({}));
    body["context"]["System"]["application"]["applicationId"] =
      json!("amzn1.ask.skill.someone-else");
    let resp = app().oneshot(post_json(body.to_string())).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn test_rejects_malformed_body() {
    let resp = app()
      .oneshot(post_json("{ not json".into()))
      .await
      .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_health() {
    let req = http::Request::builder()
      .uri("/health")
      .body(Body::empty())
      .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"ok");
  }
}
