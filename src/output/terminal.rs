// Colored terminal output for generated posts, post listings and corpus stats.

use colored::Colorize;
use std::collections::BTreeMap;

use super::{one_line, truncate_chars};
use crate::model::{GeneratedPost, LengthBucket, Post};
use crate::pipeline::ingest::IngestReport;

/// Show a freshly generated post and the examples behind it.
pub fn display_generated(post: &GeneratedPost) {
    println!("\n{}", "=== Draft ===".bold());
    println!();
    println!("{}", post.text.trim());
    println!();

    if post.examples.is_empty() {
        println!(
            "{}",
            "No past posts available, so the draft follows the constraints only.".dimmed()
        );
        return;
    }

    println!(
        "{}",
        format!(
            "Style examples ({}, {} used):",
            post.selection_step,
            post.examples.len()
        )
        .dimmed()
    );
    for example in &post.examples {
        println!(
            "  {} {}",
            format!("#{}", example.id).dimmed(),
            truncate_chars(&one_line(&example.text), 90).dimmed()
        );
    }
}

/// List stored posts with their attributes.
pub fn display_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No matching posts. Run `quill ingest` to add some.");
        return;
    }

    println!(
        "  {:>5}  {:<20} {:<10} {:<7}  Text",
        "ID".dimmed(),
        "Topic".dimmed(),
        "Lang".dimmed(),
        "Length".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for post in posts {
        let topic = if post.topic == crate::model::UNKNOWN {
            post.topic.dimmed().to_string()
        } else {
            post.topic.cyan().to_string()
        };
        println!(
            "  {:>5}  {:<20} {:<10} {:<7}  {}",
            post.id,
            topic,
            post.language,
            post.length_bucket,
            truncate_chars(&one_line(&post.text), 50),
        );
    }
    println!("\n  {} posts", posts.len());
}

/// Summarize an ingestion run.
pub fn display_ingest_report(report: &IngestReport) {
    println!("\n{}", "Ingestion complete.".bold());
    println!("  Posts stored:          {}", report.stored);
    if report.skipped_empty > 0 {
        println!(
            "  Skipped (empty text):  {}",
            report.skipped_empty.to_string().yellow()
        );
    }
    if report.defaulted > 0 {
        println!(
            "  Stored with defaults:  {}  {}",
            report.defaulted.to_string().yellow(),
            "(classification failed)".dimmed()
        );
    }
    if report.unified > 0 {
        println!("  Topics unified:        {}", report.unified);
    }
}

/// Per-attribute breakdown of the corpus.
pub fn display_corpus_stats(posts: &[Post]) {
    println!("{}", format!("Corpus: {} posts", posts.len()).bold());
    if posts.is_empty() {
        return;
    }

    let mut topics: BTreeMap<&str, usize> = BTreeMap::new();
    let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts {
        *topics.entry(post.topic.as_str()).or_default() += 1;
        *languages.entry(post.language.as_str()).or_default() += 1;
    }

    print_counts("Topics", &topics);
    print_counts("Languages", &languages);

    println!("\n  {}", "Lengths".bold());
    for bucket in LengthBucket::ALL {
        let count = posts.iter().filter(|p| p.length_bucket == bucket).count();
        println!("    {:<20} {:>5}", bucket.as_str(), count);
    }
}

fn print_counts(title: &str, counts: &BTreeMap<&str, usize>) {
    println!("\n  {}", title.bold());
    let mut ranked: Vec<(&&str, &usize)> = counts.iter().collect();
    // Most common first; ties stay alphabetical.
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    for (label, count) in ranked {
        println!("    {:<20} {:>5}", label, count);
    }
}
