//! snapask library crate.
//!
//! Point the webcam at a written question: a captured frame is converted to
//! grayscale, handed to an OCR engine, sanitized, and sent to a
//! chat-completion endpoint. The binary in `main.rs` wires these modules to
//! a terminal surface; integration tests drive them directly.

pub mod camera;
pub mod cli;
pub mod config;
pub mod filter;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
