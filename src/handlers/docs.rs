//! Interactive API documentation.
//!
//! - `GET /swagger/doc.json` - OpenAPI 3 document
//! - `GET /swagger`, `GET /swagger/{*path}` - Swagger UI loading `doc.json`
//!
//! The UI assets are pulled from a CDN by the browser; nothing is bundled.

use axum::Json;
use axum::extract::Path;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Value, json};

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Kafka producer - API docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/swagger/doc.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_index() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

/// Serve `doc.json` or the UI page for any other path under `/swagger`.
pub async fn swagger(Path(path): Path<String>) -> Response {
    match path.as_str() {
        "doc.json" => Json(openapi_document()).into_response(),
        _ => Html(SWAGGER_UI_HTML).into_response(),
    }
}

/// OpenAPI 3 description of the record endpoints.
pub fn openapi_document() -> Value {
    let error_response = json!({
        "description": "Invalid data or failed to send",
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    });

    let too_large = json!({
        "description": "Request body above the configured size limit",
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Kafka producer",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "fio sender"
        },
        "paths": {
            "/": {
                "get": {
                    "summary": "welcome",
                    "responses": {
                        "200": {
                            "description": "Welcome text",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            },
            "/send-fio": {
                "post": {
                    "summary": "produce",
                    "description": "method to send fio",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Fio" } } }
                    },
                    "responses": {
                        "200": {
                            "description": "Accepted for sending; echoes the record",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Fio" } } }
                        },
                        "400": error_response.clone(),
                        "413": too_large.clone()
                    }
                }
            },
            "/send-fio/list": {
                "post": {
                    "summary": "produce list",
                    "description": "method to send a list of fio",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Fio" } }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "All records accepted; echoes the list",
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Fio" } }
                                }
                            }
                        },
                        "400": error_response,
                        "413": too_large
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "health",
                    "responses": { "200": { "description": "Producer status and delivery counters" } }
                }
            }
        },
        "components": {
            "schemas": {
                "Fio": {
                    "type": "object",
                    "properties": {
                        "surname": { "type": "string" },
                        "first_name": { "type": "string" },
                        "last_name": { "type": "string" }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "message": { "type": "string" }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_record_endpoints() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/send-fio"));
        assert!(paths.contains_key("/send-fio/list"));
        assert_eq!(
            doc["components"]["schemas"]["Fio"]["properties"]
                .as_object()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_ui_points_at_document() {
        assert!(SWAGGER_UI_HTML.contains("/swagger/doc.json"));
    }
}
