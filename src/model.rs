// Data model — the types that flow through the extraction and generation pipeline.
//
// Posts are immutable once built. Attribute labels are plain strings because
// the model is free to invent topics; the length bucket is a closed enum so an
// invalid value can't exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuillError, Result};

/// Sentinel used for a topic or language the extractor couldn't determine.
pub const UNKNOWN: &str = "unknown";

/// Posts with at most this many words are `Short`.
pub const SHORT_MAX_WORDS: usize = 40;
/// Posts with at most this many words (and more than `SHORT_MAX_WORDS`) are `Medium`.
pub const MEDIUM_MAX_WORDS: usize = 120;

/// Coarse size class of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 3] = [LengthBucket::Short, LengthBucket::Medium, LengthBucket::Long];

    /// Bucket a text by its whitespace-separated word count.
    pub fn from_text(text: &str) -> Self {
        Self::from_word_count(text.split_whitespace().count())
    }

    pub fn from_word_count(words: usize) -> Self {
        match words {
            w if w <= SHORT_MAX_WORDS => LengthBucket::Short,
            w if w <= MEDIUM_MAX_WORDS => LengthBucket::Medium,
            _ => LengthBucket::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthBucket::Short => "short",
            LengthBucket::Medium => "medium",
            LengthBucket::Long => "long",
        }
    }

    /// How long the generated post should be, in terms the model follows well.
    pub fn guidance(&self) -> &'static str {
        match self {
            LengthBucket::Short => "1 to 5 lines",
            LengthBucket::Medium => "6 to 10 lines",
            LengthBucket::Long => "11 to 15 lines",
        }
    }
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LengthBucket {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(LengthBucket::Short),
            "medium" => Ok(LengthBucket::Medium),
            "long" => Ok(LengthBucket::Long),
            other => Err(QuillError::InvalidInput(format!(
                "unknown length bucket '{other}' (expected short, medium or long)"
            ))),
        }
    }
}

/// Attributes derived for one post by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAttributes {
    pub topic: String,
    pub language: String,
    pub length_bucket: LengthBucket,
}

impl PostAttributes {
    /// The attributes we fall back to when the model gives us nothing usable.
    /// Length is still derived locally so it's always meaningful.
    pub fn fallback(text: &str) -> Self {
        Self {
            topic: UNKNOWN.to_string(),
            language: UNKNOWN.to_string(),
            length_bucket: LengthBucket::from_text(text),
        }
    }
}

/// A historical post together with its derived attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Insertion sequence number assigned by the store (0 until stored).
    pub id: i64,
    pub text: String,
    pub topic: String,
    pub language: String,
    pub length_bucket: LengthBucket,
}

impl Post {
    /// Build a post from its text and attributes. Rejects empty text.
    pub fn new(text: impl Into<String>, attributes: PostAttributes) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuillError::InvalidInput("post text is empty".to_string()));
        }
        Ok(Self {
            id: 0,
            text,
            topic: attributes.topic,
            language: attributes.language,
            length_bucket: attributes.length_bucket,
        })
    }

    pub fn attributes(&self) -> PostAttributes {
        PostAttributes {
            topic: self.topic.clone(),
            language: self.language.clone(),
            length_bucket: self.length_bucket,
        }
    }
}

/// What the user wants the new post to look like. `None` means no preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: Option<String>,
    pub language: Option<String>,
    pub length_bucket: Option<LengthBucket>,
}

impl GenerationRequest {
    pub fn new(
        topic: Option<String>,
        language: Option<String>,
        length_bucket: Option<LengthBucket>,
    ) -> Self {
        // Blank strings from a CLI or form count as "no preference".
        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            topic: clean(topic),
            language: clean(language),
            length_bucket,
        }
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub text: String,
    /// The past posts that were shown to the model as style references.
    pub examples: Vec<Post>,
    /// Which rung of the relaxation ladder supplied the examples.
    pub selection_step: crate::select::LadderStep,
}
