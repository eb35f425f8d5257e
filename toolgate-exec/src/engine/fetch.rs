use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use toolgate_core::types::{Descriptor, MimeType, Route};
use tracing::{debug, warn};

use crate::engine::http::{HttpClient, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
use crate::engine::{build_payload, redact_headers, Payload, RequestStruct, ServerParams};
use crate::hooks::{HandlerMap, Hook, HookContext, HookPhase};
use crate::pipeline::ActivationBundle;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Turns a route plus caller parameters into a request, runs the route's hooks around it,
/// and reports the outcome as a [`RequestStruct`].
///
/// Every failure ends up in the returned struct; `execute` itself never errors.
pub struct RequestEngine {
    client: Arc<dyn HttpClient>,
    config: EngineConfig,
}

impl Default for RequestEngine {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()), EngineConfig::default())
    }
}

impl RequestEngine {
    pub fn new(client: Arc<dyn HttpClient>, config: EngineConfig) -> Self {
        Self { client, config }
    }

    /// Run a route of a successfully loaded bundle.
    pub async fn call(
        &self,
        bundle: &ActivationBundle,
        route_name: &str,
        user_params: &Map<String, Value>,
        server_params: &ServerParams,
    ) -> RequestStruct {
        match bundle.descriptor() {
            Some(main) if bundle.status => {
                self.execute(main, &bundle.handler_map, user_params, server_params, route_name)
                    .await
            }
            _ => {
                let mut request = RequestStruct::new();
                request.fail("descriptor is not loaded");
                request.finish()
            }
        }
    }

    pub async fn execute(
        &self,
        main: &Descriptor,
        handlers: &HandlerMap,
        user_params: &Map<String, Value>,
        server_params: &ServerParams,
        route_name: &str,
    ) -> RequestStruct {
        let mut request = RequestStruct::new();

        let Some(route) = main.route(route_name) else {
            request.fail(format!(
                "Route \"{route_name}\" not found in namespace \"{}\"",
                main.namespace
            ));
            return request.finish();
        };

        let missing: Vec<&str> = main
            .required_server_params
            .iter()
            .filter(|p| !server_params.contains(p))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            request.fail(format!(
                "Missing required server params: {}",
                missing.join(", ")
            ));
            return request.finish();
        }

        let built = match build_payload(main, route, user_params, server_params) {
            Ok(b) => b,
            Err(e) => {
                request.fail(format!("Request setup error: {e}"));
                return request.finish();
            }
        };
        debug!(
            namespace = %main.namespace,
            route = route_name,
            method = %built.payload.method,
            url = %built.payload.url,
            headers = ?redact_headers(&built.payload.headers, &built.secret_headers),
            "synthesized request"
        );

        let hooks = handlers.get(route_name).cloned().unwrap_or_default();
        let mut ctx = HookContext {
            route_name: route_name.to_string(),
            user_params: user_params.clone(),
            request,
            payload: built.payload,
            response: None,
        };

        if let Some(hook) = &hooks.pre_request {
            ctx = match run_phase(HookPhase::PreRequest, hook, ctx).await {
                Ok(c) => c,
                Err(failed) => return failed.finish(),
            };
            if !ctx.request.status {
                return ctx.request.finish();
            }
        }

        match &hooks.execute_request {
            Some(hook) => {
                ctx = match run_phase(HookPhase::ExecuteRequest, hook, ctx).await {
                    Ok(c) => c,
                    Err(failed) => return failed.finish(),
                };
                if !ctx.request.status {
                    return ctx.request.finish();
                }
                if ctx.response.is_none() {
                    ctx.response = Some(ctx.request.data.clone());
                }
            }
            None => match self.send(&ctx.payload, route).await {
                Ok(data) => ctx.response = Some(data),
                Err(message) => {
                    warn!(route = route_name, %message, "request failed");
                    ctx.request.fail(message);
                    return ctx.request.finish();
                }
            },
        }

        if let Some(hook) = &hooks.post_request {
            ctx = match run_phase(HookPhase::PostRequest, hook, ctx).await {
                Ok(c) => c,
                Err(failed) => return failed.finish(),
            };
        }

        let mut request = ctx.request;
        if let Some(response) = ctx.response {
            request.data = response;
        }
        request.finish()
    }

    async fn send(&self, payload: &Payload, route: &Route) -> Result<Value, String> {
        let body = payload
            .body_bytes()
            .map_err(|e| format!("Request setup error: {e}"))?;
        let parts = HttpRequestParts {
            method: payload.method.as_str().to_string(),
            url: payload.url.clone(),
            headers: payload.headers.clone(),
            body,
        };

        match self
            .client
            .send(parts, self.config.timeout, self.config.max_response_bytes)
            .await
        {
            Ok(resp) if resp.is_success() => Ok(decode_body(&resp, route)),
            Ok(resp) => Err(format!("HTTP error: {}", resp.status_line())),
            Err(e) if e.is_transport() => Err(format!("Network error: {e}")),
            Err(e) => Err(format!("Request setup error: {e}")),
        }
    }
}

/// Run one hook. On failure the pre-hook request state is returned with a phase-labeled message.
async fn run_phase(
    phase: HookPhase,
    hook: &Hook,
    ctx: HookContext,
) -> Result<HookContext, RequestStruct> {
    let mut before = ctx.request.clone();
    debug!(route = %ctx.route_name, %phase, "running hook");
    match hook.call(ctx).await {
        Ok(c) => Ok(c),
        Err(e) => {
            warn!(%phase, error = %e, "hook failed");
            before.fail(format!("{phase} error: {e}"));
            Err(before)
        }
    }
}

fn decode_body(resp: &HttpResponseParts, route: &Route) -> Value {
    match route.output.as_ref().map(|o| o.mime_type) {
        Some(MimeType::Png) => json!({
            "mimeType": MimeType::Png.as_str(),
            "size": resp.body.len(),
            "hex": hex::encode(&resp.body),
        }),
        Some(MimeType::Text) => Value::String(String::from_utf8_lossy(&resp.body).into_owned()),
        _ => {
            if resp.body.is_empty() {
                return Value::Null;
            }
            serde_json::from_slice(&resp.body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&resp.body).into_owned()))
        }
    }
}
