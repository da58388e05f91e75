use std::io::Write;

use console::{measure_text_width, pad_str, style, truncate_str, Alignment};

use crate::aggregate::FetchFailure;
use crate::common::*;

const SOURCE_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 50;
const AUTHOR_WIDTH: usize = 20;
const DATE_WIDTH: usize = 16;

// truncate_str adds its tail once the text reaches `width`, so only call it
// for text that overflows the column.
fn cell(s: &str, width: usize) -> String {
    if measure_text_width(s) > width {
        truncate_str(s, width, "…").into_owned()
    } else {
        pad_str(s, width, Alignment::Left, None).into_owned()
    }
}

fn published(post: &Post) -> String {
    post.published_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Writes one table row per post, in the order given.
pub fn render<W: Write>(posts: &[Post], out: &mut W) -> Result<(), OutputError> {
    if posts.is_empty() {
        writeln!(out, "{}", style("No posts found").yellow())?;
        return Ok(());
    }

    let header = format!(
        "{} {} {} {} {}",
        cell("Source", SOURCE_WIDTH),
        cell("Title", TITLE_WIDTH),
        cell("Author", AUTHOR_WIDTH),
        cell("Published", DATE_WIDTH),
        "URL"
    );
    writeln!(out, "{}", style(header).bold())?;
    let rule_width = SOURCE_WIDTH + TITLE_WIDTH + AUTHOR_WIDTH + DATE_WIDTH + 4 + 3;
    writeln!(out, "{}", "─".repeat(rule_width))?;

    for post in posts {
        writeln!(
            out,
            "{} {} {} {} {}",
            style(cell(post.source.display_name(), SOURCE_WIDTH)).cyan(),
            cell(&post.title, TITLE_WIDTH),
            style(cell(&post.author, AUTHOR_WIDTH)).magenta(),
            style(cell(&published(post), DATE_WIDTH)).green(),
            post.url
        )?;
    }

    let mut counts: Vec<(Source, usize)> = Vec::new();
    for post in posts {
        match counts.iter_mut().find(|(s, _)| *s == post.source) {
            Some((_, n)) => *n += 1,
            None => counts.push((post.source, 1)),
        }
    }
    let summary: Vec<String> = counts
        .iter()
        .map(|(s, n)| format!("{} from {}", n, s))
        .collect();
    writeln!(out, "\n{} posts: {}", posts.len(), summary.join(", "))?;
    out.flush()?;
    Ok(())
}

/// Lists the (tag, source) fetches that failed, if any.
pub fn render_failures<W: Write>(
    failures: &[FetchFailure],
    attempts: usize,
    out: &mut W,
) -> Result<(), OutputError> {
    if failures.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "{}",
        style(format!(
            "Warning: {} of {} fetches failed",
            failures.len(),
            attempts
        ))
        .yellow()
        .bold()
    )?;
    for failure in failures {
        writeln!(
            out,
            "  {} #{}: {}",
            style(failure.source).yellow(),
            failure.tag,
            failure.error
        )?;
    }
    out.flush()?;
    Ok(())
}
