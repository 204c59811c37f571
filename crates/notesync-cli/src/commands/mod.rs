pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod get;
pub mod input;
pub mod list;
pub mod pin;
pub mod search;
