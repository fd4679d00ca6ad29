//! HTTP plumbing: requests, the transport and the authenticated pipeline.

pub mod error_body;
mod multipart;
mod pipeline;
mod request;
mod transport;

pub use multipart::{FilePart, FormPart, MultipartForm};
pub use pipeline::Pipeline;
pub use request::{ApiRequest, ApiResponse, Params, RequestBody};
pub use transport::{HttpTransport, Transport};

/// Shown to the user when a refresh fails and the session is ended.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
