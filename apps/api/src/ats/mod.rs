pub mod cache;
pub mod education;
pub mod experience;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod responsibilities;
pub mod scoring;
pub mod skills;
pub mod store;
pub mod text;
