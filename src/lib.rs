// Quill: draft new social-media posts in your own past style.
//
// This is the library root. Build phase: source -> extract -> store.
// Per request: select -> prompt -> generate.

pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod select;
pub mod source;
pub mod status;
pub mod store;
