//! Transparent payload encryption.
//!
//! Clients may send `{"encData": "<envelope>"}` instead of a plain JSON body on
//! writes; the envelope is opened before the handler runs. Successful JSON
//! responses are sealed the same way on the way out.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde_json::{Value, json};

use crate::infrastructure::crypto::PayloadCipher;
use crate::presentation::http::error::error_response;

const ENC_FIELD: &str = "encData";
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn carries_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn invalid_payload() -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        Value::String("Invalid encrypted data".into()),
    )
}

/// Returns the decrypted body when `bytes` hold an `encData` envelope,
/// `None` when the payload is plain.
fn open_envelope(cipher: &PayloadCipher, bytes: &[u8]) -> Result<Option<Vec<u8>>, ()> {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) else {
        return Ok(None);
    };
    let Some(Value::String(sealed)) = map.get(ENC_FIELD) else {
        return Ok(None);
    };
    let opened = cipher.decrypt_to_object(sealed).map_err(|e| {
        tracing::warn!(error = ?e, "payload_decrypt_failed");
    })?;
    serde_json::to_vec(&opened).map(Some).map_err(|_| ())
}

async fn decrypt_request(cipher: &Arc<PayloadCipher>, req: Request) -> Result<Request, Response> {
    if !carries_body(req.method()) || !is_json(req.headers()) {
        return Ok(req);
    }
    let (mut parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| invalid_payload())?;
    // Key derivation is CPU bound; keep it off the async workers.
    let opened = {
        let cipher = cipher.clone();
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || open_envelope(&cipher, &bytes))
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "payload_decrypt_task_failed");
                invalid_payload()
            })?
    };
    let body = match opened {
        Ok(Some(plain)) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Body::from(plain)
        }
        Ok(None) => Body::from(bytes),
        Err(()) => return Err(invalid_payload()),
    };
    Ok(Request::from_parts(parts, body))
}

async fn encrypt_response(cipher: &Arc<PayloadCipher>, resp: Response) -> Response {
    if !resp.status().is_success() || !is_json(resp.headers()) {
        return resp;
    }
    let (mut parts, body) = resp.into_parts();
    let bytes: Bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = ?e, "response_body_read_failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Value::String("Internal server error".into()),
            );
        }
    };
    let sealed = {
        let cipher = cipher.clone();
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || {
            serde_json::from_slice::<Value>(&bytes)
                .map_err(anyhow::Error::from)
                .and_then(|v| cipher.encrypt_object(&v))
                .and_then(|enc| Ok(serde_json::to_vec(&json!({ ENC_FIELD: enc }))?))
        })
        .await
        .map_err(anyhow::Error::from)
        .and_then(|r| r)
    };
    match sealed {
        Ok(out) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(out))
        }
        Err(e) => {
            tracing::warn!(error = ?e, "payload_encrypt_failed");
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

pub async fn encrypt_payloads(
    State(cipher): State<Arc<PayloadCipher>>,
    req: Request,
    next: Next,
) -> Response {
    let req = match decrypt_request(&cipher, req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let resp = next.run(req).await;
    encrypt_response(&cipher, resp).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(cipher: Arc<PayloadCipher>) -> Router {
        Router::new()
            .route("/echo", post(|Json(v): Json<Value>| async move { Json(v) }))
            .route(
                "/fail",
                post(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "nope"}))) }),
            )
            .layer(axum::middleware::from_fn_with_state(cipher, encrypt_payloads))
    }

    fn json_post(uri: &str, body: Value) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn sealed_request_round_trips() {
        let cipher = Arc::new(PayloadCipher::new("k3y"));
        let payload = json!({"name": "Gran Reserva"});
        let sealed = cipher.encrypt_object(&payload).unwrap();

        let resp = app(cipher.clone())
            .oneshot(json_post("/echo", json!({ "encData": sealed })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        let enc = body["encData"].as_str().unwrap();
        assert_eq!(cipher.decrypt_to_object(enc).unwrap(), payload);
    }

    #[tokio::test]
    async fn plain_requests_pass_through() {
        let cipher = Arc::new(PayloadCipher::new("k3y"));
        let resp = app(cipher.clone())
            .oneshot(json_post("/echo", json!({"a": 1})))
            .await
            .unwrap();
        let body = json_body(resp).await;
        let enc = body["encData"].as_str().unwrap();
        assert_eq!(cipher.decrypt_to_object(enc).unwrap(), json!({"a": 1}));
    }

    #[tokio::test]
    async fn bad_envelope_is_rejected() {
        let cipher = Arc::new(PayloadCipher::new("k3y"));
        let other = PayloadCipher::new("other").encrypt_object(&json!({"a": 1})).unwrap();
        let resp = app(cipher)
            .oneshot(json_post("/echo", json!({ "encData": other })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["message"], "Invalid encrypted data");
    }

    #[tokio::test]
    async fn envelopes_with_a_raised_key_cost_are_rejected() {
        use base64::Engine as _;
        let cipher = Arc::new(PayloadCipher::new("k3y"));
        let b64 = base64::engine::general_purpose::STANDARD;
        let sealed = cipher.encrypt_object(&json!({"a": 1})).unwrap();
        let mut env: Value = serde_json::from_slice(&b64.decode(sealed).unwrap()).unwrap();
        env["iterations"] = json!(u32::MAX);
        let tampered = b64.encode(serde_json::to_vec(&env).unwrap());

        let resp = app(cipher)
            .oneshot(json_post("/echo", json!({ "encData": tampered })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["message"], "Invalid encrypted data");
    }

    #[tokio::test]
    async fn error_responses_stay_plain() {
        let cipher = Arc::new(PayloadCipher::new("k3y"));
        let resp = app(cipher)
            .oneshot(json_post("/fail", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["message"], "nope");
    }
}
