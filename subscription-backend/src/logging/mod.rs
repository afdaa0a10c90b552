// src/logging/mod.rs

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// リクエスト単位のログ用コンテキスト
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    /// 認証済みの場合の user / customer ID
    pub actor_id: Option<Uuid>,
    pub path: String,
    pub method: String,
}

/// リクエストの開始・完了をログに出す
///
/// 完了ログのレベルはステータスクラスで決まる（5xx: error, 4xx: warn）。
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let context = req.extensions().get::<RequestContext>().cloned();

    if let Some(context) = &context {
        info!(
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            "Request started"
        );
    }

    let response = next.run(req).await;

    // 認証ミドルウェアがアクター情報を付けて返していればそちらを使う
    let context = response
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .or(context);

    if let Some(context) = &context {
        log_completion(context, response.status().as_u16(), start.elapsed());
    }

    response
}

fn log_completion(context: &RequestContext, status: u16, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;
    let actor_id = context.actor_id.map(|id| id.to_string());

    match status {
        500.. => error!(
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            status,
            duration_ms,
            actor_id = ?actor_id,
            "Request completed"
        ),
        400..=499 => warn!(
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            status,
            duration_ms,
            actor_id = ?actor_id,
            "Request completed"
        ),
        _ => info!(
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            status,
            duration_ms,
            actor_id = ?actor_id,
            "Request completed"
        ),
    }
}

/// RequestContext を生成してリクエストに載せる
pub async fn inject_request_context(mut req: Request<Body>, next: Next) -> Response {
    let context = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        actor_id: None,
        path: req.uri().path().to_string(),
        method: req.method().to_string(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}
