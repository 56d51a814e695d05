//! HTTP API.
//!
//! `GET /` status, `POST /api/analyze` and `POST /api/generate-pdf`, served
//! by axum behind CORS and request tracing. Handlers run the blocking
//! pipeline on the blocking pool; `ApiContext` carries configuration and
//! the factory that builds assistant clients.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve_until_ctrl_c, start_api_server, ApiServer, ServerError};
pub use types::{ApiContext, AssistantFactory, OpenAiAssistantFactory};
