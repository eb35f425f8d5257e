#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use toolgate_core::Descriptor;
use toolgate_exec::engine::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};

/// Records every request and answers with a fixed response or error.
pub struct MockHttpClient {
    pub response: HttpResponseParts,
    pub fail_with: Option<HttpError>,
    pub requests: Mutex<Vec<HttpRequestParts>>,
}

impl MockHttpClient {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            response: HttpResponseParts {
                status,
                headers: BTreeMap::new(),
                body: body.as_bytes().to_vec(),
            },
            fail_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: HttpError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::ok("")
        }
    }

    pub fn sent(&self) -> Vec<HttpRequestParts> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        self.requests.lock().unwrap().push(req);
        if let Some(ref err) = self.fail_with {
            return Err(err.clone());
        }
        Ok(self.response.clone())
    }
}

pub fn sample_main() -> Value {
    json!({
        "namespace": "demo",
        "name": "Demo API",
        "description": "Example descriptor",
        "version": "2.0.0",
        "root": "https://api.example.com",
        "requiredServerParams": ["API_KEY"],
        "headers": { "x-api-key": "{{SERVER_PARAM:API_KEY}}" },
        "routes": {
            "search": {
                "method": "GET",
                "path": "/search",
                "description": "Search users",
                "parameters": [
                    {
                        "position": { "key": "q", "value": "{{USER_PARAM}}", "location": "query" },
                        "z": { "primitive": "string()", "options": [] }
                    }
                ],
                "output": { "mimeType": "application/json", "schema": {} }
            },
            "update": {
                "method": "POST",
                "path": "/users/{{id}}",
                "description": "Update a user",
                "parameters": [
                    {
                        "position": { "key": "id", "value": "{{USER_PARAM}}", "location": "insert" },
                        "z": { "primitive": "string()", "options": [] }
                    },
                    {
                        "position": { "key": "name", "value": "{{USER_PARAM}}", "location": "body" },
                        "z": { "primitive": "string()", "options": [] }
                    },
                    {
                        "position": { "key": "source", "value": "toolgate", "location": "body" },
                        "z": { "primitive": "string()", "options": [] }
                    }
                ]
            }
        }
    })
}

pub fn sample_descriptor() -> Descriptor {
    serde_json::from_value(sample_main()).unwrap()
}
