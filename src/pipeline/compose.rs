// Generation pipeline: request -> examples -> prompt -> post.
//
// Runs start to finish for one request. Any failure returns an error and no
// text; there is no partial result.

use tracing::info;

use crate::error::Result;
use crate::generate::Generator;
use crate::model::{GeneratedPost, GenerationRequest};
use crate::prompt;
use crate::select;
use crate::store::PostStore;

pub async fn run(
    request: &GenerationRequest,
    max_examples: usize,
    store: &dyn PostStore,
    generator: &Generator,
) -> Result<GeneratedPost> {
    let selection = select::select(store, request, max_examples).await?;

    info!(
        step = %selection.step,
        examples = selection.examples.len(),
        topic = request.topic.as_deref().unwrap_or("any"),
        "Selected style examples"
    );

    let prompt = prompt::build(request, &selection.examples);
    let text = generator.generate(&prompt).await?;

    Ok(GeneratedPost {
        text,
        examples: selection.examples,
        selection_step: selection.step,
    })
}
