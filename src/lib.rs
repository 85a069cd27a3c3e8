pub mod config;
pub mod error;
pub mod grading;
pub mod headers;
pub mod labels;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod reorganize;
pub mod table;
