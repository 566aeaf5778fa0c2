//! Label requirement datasets with linguistic categories from word lists.

pub mod handlers;
pub mod output;
pub mod pipeline;
pub mod rate_limit;
pub mod requirement;
pub mod resolver;
pub mod rules;
pub mod tools;

pub use handlers::{AppState, MAX_TEXT_LEN, router};
pub use output::LabelWriter;
pub use pipeline::{
    Label, LabelContext, RunStats, SharedAnnotator, build_annotator, label_file, label_stream,
    label_text,
};
pub use requirement::{LineError, Requirement, parse_requirement_line};
pub use resolver::resolve;
pub use rules::{CategoryRule, CategoryRules, RulesError};
