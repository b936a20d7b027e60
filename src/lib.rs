pub mod config;
pub mod db;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod util;
pub mod web;
