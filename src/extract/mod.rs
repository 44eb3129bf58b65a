// Attribute extraction — classify posts by topic, language, and length.

pub mod llm;
pub mod parse;
pub mod unify;
