// Inference request/response handling for workspace photos.
// All model traffic goes through llm_client via the backend trait.

pub mod analyzer;
pub mod backend;
pub mod dashboard;
pub mod handlers;
pub mod models;
pub mod prompts;
