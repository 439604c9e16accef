use std::sync::LazyLock;

use regex::Regex;

use crate::editor::{Edit, Selection};

/// HTML elements that never take a closing tag.
pub const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// An opening tag still waiting for its `>`: `<name` plus optional
/// attributes, running to the end of the haystack.
static OPEN_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?$").ok());

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Edit for a `>` typed at the end of an unfinished opening tag.
///
/// Replaces the selection with `>` plus the matching closing tag and leaves
/// the caret between the two. Returns `None` (insert `>` normally) when the
/// text before the selection is not an open tag or names a void element.
pub fn auto_close_tag(text: &str, selection: Selection) -> Option<Edit> {
    let start = selection.start();
    let end = selection.end();
    let before = text.get(..start)?;
    text.get(end..)?;

    // An open tag cannot contain '<', so only the text after the last one
    // can match.
    let tail = &before[before.rfind('<')?..];
    let captures = OPEN_TAG.as_ref()?.captures(tail)?;
    let name = captures.get(1)?.as_str().to_ascii_lowercase();
    if is_void_element(&name) {
        return None;
    }

    Some(Edit {
        range: start..end,
        text: format!("></{name}>"),
        selection: Selection::caret(start + 1),
    })
}
