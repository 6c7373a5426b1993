//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! accepted TCP connection
//!     → server.rs (accept loop, one detached task per connection)
//!     → request.rs (bounded line reads, request line split)
//!     → pipeline.rs (cache check, origin exchange, relay)
//!         → url.rs (absolute-form target → host, port, path)
//!         → headers.rs (client headers → origin header block)
//! ```

pub mod headers;
pub mod pipeline;
pub mod request;
pub mod server;
pub mod url;

pub use headers::{HeaderBlock, HeaderRewriter};
pub use pipeline::{Outcome, RequestPipeline};
pub use request::RequestLine;
pub use server::ProxyServer;
pub use url::ParsedUrl;
