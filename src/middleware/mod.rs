//! Actix middleware: trace id propagation, request spans, structured
//! request logging, security headers and the page access gate.

pub mod request_trace;
pub mod security_headers;
pub mod session_gate;
pub mod structured_logger;
pub mod trace_span;

pub use request_trace::RequestTrace;
pub use security_headers::SecurityHeaders;
pub use session_gate::SessionGate;
pub use structured_logger::StructuredLogger;
pub use trace_span::TraceSpan;
