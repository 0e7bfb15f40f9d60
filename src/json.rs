//! A JSON body extractor that reports bad request bodies with the crate's error format.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::Error;

/// Extract a JSON request body.
///
/// Works like [axum::Json] except a body that cannot be parsed is rejected
/// with [Error::InvalidJson], so clients get the usual `{"error": ...}` body
/// and a 400 status.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidJson(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::ApiJson;

    #[derive(Deserialize)]
    struct Greeting {
        name: String,
    }

    async fn greet(ApiJson(greeting): ApiJson<Greeting>) -> String {
        format!("hello {}", greeting.name)
    }

    fn server() -> TestServer {
        let app = Router::new().route("/greet", post(greet));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn accepts_valid_json() {
        let response = server()
            .post("/greet")
            .json(&json!({ "name": "jane" }))
            .await;

        response.assert_status_ok();
        response.assert_text("hello jane");
    }

    #[tokio::test]
    async fn rejects_malformed_json_with_error_body() {
        let response = server()
            .post("/greet")
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn rejects_wrong_shape_with_bad_request() {
        let response = server()
            .post("/greet")
            .json(&json!({ "nickname": "jane" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
