//! Builds change lists from commit messages and release notes.

use crate::db::ChangeList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    New,
    Fixed,
}

/// Strip a leading `New:` / `Fixed:` / `Fix:` tag (case-insensitive).
fn split_tag(message: &str) -> (Option<Category>, &str) {
    const TAGS: [(&str, Category); 3] = [
        ("new:", Category::New),
        ("fixed:", Category::Fixed),
        ("fix:", Category::Fixed),
    ];

    for (tag, category) in TAGS {
        if message.len() >= tag.len()
            && message.is_char_boundary(tag.len())
            && message[..tag.len()].eq_ignore_ascii_case(tag)
        {
            return (Some(category), message[tag.len()..].trim());
        }
    }
    (None, message)
}

fn push(list: &mut ChangeList, category: Category, message: &str) {
    if message.is_empty() {
        return;
    }
    match category {
        Category::New => list.new.push(message.to_string()),
        Category::Fixed => list.fixed.push(message.to_string()),
    }
}

/// Categorize upstream commit messages; untagged messages count as new.
pub fn from_messages<I, S>(messages: I) -> ChangeList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list = ChangeList::default();
    for message in messages {
        let (category, text) = split_tag(message.as_ref().trim());
        push(&mut list, category.unwrap_or(Category::New), text);
    }
    list
}

/// Collect bullet lines from release notes.
///
/// A markdown heading mentioning "fix" switches following bullets to
/// fixes, any other heading back to new; an explicit tag on the bullet wins.
pub fn from_release_notes(body: &str) -> ChangeList {
    let mut list = ChangeList::default();
    let mut section = Category::New;

    for line in body.lines() {
        let line = line.trim();

        if let Some(heading) = line.strip_prefix('#') {
            section = if heading.to_lowercase().contains("fix") {
                Category::Fixed
            } else {
                Category::New
            };
            continue;
        }

        let Some(item) = ["- ", "* ", "+ "]
            .iter()
            .find_map(|marker| line.strip_prefix(marker))
        else {
            continue;
        };

        let (category, text) = split_tag(item.trim());
        push(&mut list, category.unwrap_or(section), text);
    }
    list
}
