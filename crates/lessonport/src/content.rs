use markdown::mdast::{Heading, Node};
use serde::Serialize;

/// Title and description text taken from a section's markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionHeading {
    pub title: Option<String>,
    pub description: Vec<String>,
}

fn top_level_headings(text: &str) -> Vec<Heading> {
    let root = match markdown::to_mdast(text, &markdown::ParseOptions::default()) {
        Ok(root) => root,
        Err(err) => {
            tracing::debug!(%err, "markdown parse failed; treating text as heading-less");
            return Vec::new();
        }
    };

    root.children()
        .map(|children| {
            children
                .iter()
                .filter_map(|node| match node {
                    Node::Heading(heading) => Some(heading.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn plain_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&t.value),
        Node::InlineCode(c) => out.push_str(&c.value),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    plain_text(child, out);
                }
            }
        }
    }
}

fn heading_text(heading: &Heading) -> Option<String> {
    let mut title = String::new();
    for child in &heading.children {
        plain_text(child, &mut title);
    }
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Picks the first level-1 heading, or the first heading of any depth when the document
/// has no level-1 heading.
fn title_heading(headings: &[Heading]) -> Option<&Heading> {
    headings
        .iter()
        .find(|heading| heading.depth == 1)
        .or_else(|| headings.first())
}

/// Plain text of the document's title heading.
pub fn first_heading(text: &str) -> Option<String> {
    let headings = top_level_headings(text);
    title_heading(&headings).and_then(heading_text)
}

/// Extracts the section title plus the block of text between the title heading and the
/// next heading (or the end of the document).
pub fn section_heading(text: &str) -> SectionHeading {
    let headings = top_level_headings(text);
    let Some(title) = title_heading(&headings) else {
        return SectionHeading::default();
    };

    let start = title
        .position
        .as_ref()
        .map(|pos| pos.end.offset)
        .unwrap_or(text.len());
    let end = headings
        .iter()
        .filter_map(|heading| heading.position.as_ref().map(|pos| pos.start.offset))
        .find(|offset| *offset >= start)
        .unwrap_or(text.len());

    let block = text
        .get(start..end)
        .unwrap_or_default()
        .trim_start_matches(['\n', '\r'])
        .trim_end();

    SectionHeading {
        title: heading_text(title),
        description: if block.is_empty() {
            Vec::new()
        } else {
            block.lines().map(str::to_string).collect()
        },
    }
}
