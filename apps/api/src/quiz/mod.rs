pub mod catalog;
pub mod extract;
pub mod feedback;
pub mod format;
pub mod generator;
pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
pub mod result_view;
pub mod scoring;
pub mod session;
pub mod validation;
