// Prompt construction for generation.
//
// Layout: instruction, explicit constraints, then (if any) the few-shot
// examples fenced by `---` lines. Requested values are copied in verbatim;
// an unset attribute reads "any". Output depends only on the inputs.

use std::fmt::Write;

use crate::model::{GenerationRequest, Post};

const INSTRUCTION: &str = "\
Write a new social-media post matching the style of the following examples. \
No preamble: reply with the post text only.";

const NO_EXAMPLES_INSTRUCTION: &str = "\
Write a new social-media post that satisfies the constraints below. \
No preamble: reply with the post text only.";

/// Separator placed before and after every example.
pub const EXAMPLE_DELIMITER: &str = "---";

/// Compose the generation prompt.
pub fn build(request: &GenerationRequest, examples: &[Post]) -> String {
    let mut prompt = String::new();

    prompt.push_str(if examples.is_empty() {
        NO_EXAMPLES_INSTRUCTION
    } else {
        INSTRUCTION
    });
    prompt.push_str("\n\n");

    prompt.push_str("Constraints for the new post:\n");
    let _ = writeln!(prompt, "1) Topic: {}", request.topic.as_deref().unwrap_or("any"));
    match request.length_bucket {
        Some(bucket) => {
            let _ = writeln!(prompt, "2) Length: {} ({})", bucket, bucket.guidance());
        }
        None => prompt.push_str("2) Length: any\n"),
    }
    let _ = writeln!(
        prompt,
        "3) Language: {}",
        request.language.as_deref().unwrap_or("any")
    );
    prompt.push_str(
        "If the language is a mix (for example Hinglish, Hindi + English), \
         write it in Latin script.\n",
    );

    if !examples.is_empty() {
        prompt.push_str("\nUse the writing style of these examples:\n");
        for (i, example) in examples.iter().enumerate() {
            let _ = write!(
                prompt,
                "\nExample {}:\n{EXAMPLE_DELIMITER}\n{}\n{EXAMPLE_DELIMITER}\n",
                i + 1,
                example.text.trim_end()
            );
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LengthBucket, PostAttributes};

    fn example(text: &str) -> Post {
        Post::new(text, PostAttributes::fallback(text)).unwrap()
    }

    #[test]
    fn zero_examples_omits_few_shot_section() {
        let req = GenerationRequest::new(
            Some("cooking".into()),
            Some("en".into()),
            Some(LengthBucket::Medium),
        );
        let prompt = build(&req, &[]);
        assert!(!prompt.contains("Example 1"));
        assert!(!prompt.contains(EXAMPLE_DELIMITER));
        assert!(prompt.contains("Topic: cooking"));
        assert!(prompt.contains("Language: en"));
        assert!(prompt.contains("Length: medium (6 to 10 lines)"));
    }

    #[test]
    fn examples_are_numbered_and_delimited() {
        let req = GenerationRequest::default();
        let prompt = build(&req, &[example("first post"), example("second post")]);
        assert!(prompt.contains("Example 1:\n---\nfirst post\n---"));
        assert!(prompt.contains("Example 2:\n---\nsecond post\n---"));
        assert!(prompt.contains("Topic: any"));
        assert!(prompt.contains("Length: any"));
    }

    #[test]
    fn deterministic() {
        let req = GenerationRequest::new(Some("x".into()), None, None);
        let ex = [example("a")];
        assert_eq!(build(&req, &ex), build(&req, &ex));
    }
}
