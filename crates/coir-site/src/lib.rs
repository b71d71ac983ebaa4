pub mod cache;
pub mod config;
pub mod content;
pub mod corpus;
pub mod dom;
pub mod error;
pub mod loader;
pub mod markdown;
pub mod model;
pub mod news_search;
pub mod page;
pub mod safe;
pub mod search;
pub mod server;
pub mod status;
