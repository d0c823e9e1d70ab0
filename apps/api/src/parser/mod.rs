//! Resume parsing pipeline: OCR text in, structured JSON out.

pub mod extract;
pub mod handlers;
pub mod pipeline;
pub mod prompt;
pub mod prompts;
