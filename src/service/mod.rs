//! Interactive request/response surface.
//!
//! The web UI (out of scope here) calls this endpoint; it owns the one
//! cached model handle and processes one request fully before the next.

mod session;

pub use session::{SynthesisRequest, SynthesisResponse, SynthesisService, default_output_root};
