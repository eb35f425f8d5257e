mod fetch;
pub mod http;
mod params;
mod payload;
mod redact;
mod result;

pub use fetch::{EngineConfig, RequestEngine};
pub use http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use params::ServerParams;
pub use payload::{build_payload, BuiltPayload, Payload};
pub use redact::redact_headers;
pub use result::{render_data, RequestStruct};
