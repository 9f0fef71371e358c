//! Building the rendered entry list from the candidate items.

use std::ops::Range;

use super::config::FilterFn;
use super::item::Item;

/// An item's name split around the emphasized match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    /// Text before the match.
    pub before: String,
    /// The matched text, in the name's own casing. Empty when nothing matched.
    pub emphasized: String,
    /// Text after the match.
    pub after: String,
}

impl DisplayName {
    /// A name shown without emphasis.
    pub fn plain(name: &str) -> Self {
        Self {
            before: name.to_string(),
            emphasized: String::new(),
            after: String::new(),
        }
    }

    fn split(name: &str, range: Range<usize>) -> Self {
        Self {
            before: name[..range.start].to_string(),
            emphasized: name[range.clone()].to_string(),
            after: name[range.end..].to_string(),
        }
    }

    /// Whether part of the name is emphasized.
    pub fn is_emphasized(&self) -> bool {
        !self.emphasized.is_empty()
    }
}

/// One rendered row of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The item behind the row.
    pub item: Item,
    /// Name as displayed, possibly with emphasis.
    pub display: DisplayName,
}

impl Entry {
    /// `itemId` hook.
    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    /// `itemName` hook: the plain name, never the emphasized variant.
    pub fn item_name(&self) -> &str {
        &self.item.name
    }

    /// `itemDescr` hook.
    pub fn item_descr(&self) -> &str {
        &self.item.descr
    }
}

/// Output of [`build_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedList {
    /// Entries in collection order, minus filtered-out items.
    pub entries: Vec<Entry>,
    /// Entry that should carry the highlight.
    pub highlighted: Option<String>,
    /// First entry whose name matched the typed text, if any.
    pub typed_match: Option<String>,
}

/// Build the visible entries.
///
/// Items rejected by `on_filter` are skipped. When `filter_text` has at least
/// `min_query_len` characters, the first case-insensitive occurrence of it in
/// each name is emphasized and the first such entry becomes the typed match.
/// The highlight goes to the typed match, or else to `selected_id` when that
/// entry is rendered, or else to the first entry.
pub fn build_entries(
    items: &[Item],
    filter_text: &str,
    min_query_len: usize,
    on_filter: Option<&FilterFn>,
    selected_id: Option<&str>,
) -> RenderedList {
    let searching = filter_text.chars().count() >= min_query_len && !filter_text.is_empty();
    let mut typed_match = None;
    let mut selected_rendered = None;

    let entries: Vec<Entry> = items
        .iter()
        .filter(|item| on_filter.is_none_or(|keep| keep(item)))
        .map(|item| {
            if selected_id == Some(item.id.as_str()) {
                selected_rendered = Some(item.id.clone());
            }
            let found = if searching {
                find_case_insensitive(&item.name, filter_text)
            } else {
                None
            };
            let display = match found {
                Some(range) => {
                    if typed_match.is_none() {
                        typed_match = Some(item.id.clone());
                    }
                    DisplayName::split(&item.name, range)
                }
                None => DisplayName::plain(&item.name),
            };
            Entry {
                item: item.clone(),
                display,
            }
        })
        .collect();

    let fallback = selected_rendered.or_else(|| entries.first().map(|e| e.item.id.clone()));
    RenderedList {
        highlighted: typed_match.clone().or(fallback),
        typed_match,
        entries,
    }
}

/// Byte range of the first case-insensitive occurrence of `needle` in
/// `haystack`. Comparison uses full Unicode lowercasing; the range always
/// falls on `haystack` char boundaries.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    'start: for (start, _) in haystack.char_indices() {
        let mut wanted = needle.iter();
        for (offset, c) in haystack[start..].char_indices() {
            for lower in c.to_lowercase() {
                if wanted.next() != Some(&lower) {
                    continue 'start;
                }
            }
            if wanted.len() == 0 {
                return Some(start..start + offset + c.len_utf8());
            }
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cities() -> Vec<Item> {
        vec![
            Item::new("1", "Rome", "RM"),
            Item::new("2", "Turin", "TO"),
            Item::new("3", "Trento", "TN"),
            Item::new("4", "Arezzo", "AR"),
        ]
    }

    fn ids(list: &RenderedList) -> Vec<&str> {
        list.entries.iter().map(Entry::item_id).collect()
    }

    #[test]
    fn filter_excludes_and_keeps_order() {
        let keep_odd: FilterFn = Arc::new(|item: &Item| item.id != "2" && item.id != "4");
        let list = build_entries(&cities(), "", 3, Some(&keep_odd), None);
        assert_eq!(ids(&list), vec!["1", "3"]);
    }

    #[test]
    fn typed_match_wins_and_is_emphasized_in_name_casing() {
        let list = build_entries(&cities(), "tur", 3, None, Some("1"));
        assert_eq!(list.highlighted.as_deref(), Some("2"));
        assert_eq!(list.typed_match.as_deref(), Some("2"));
        let turin = &list.entries[1].display;
        assert_eq!(
            (turin.before.as_str(), turin.emphasized.as_str(), turin.after.as_str()),
            ("", "Tur", "in")
        );
        assert!(!list.entries[0].display.is_emphasized());
    }

    #[test]
    fn text_below_threshold_has_no_typed_match() {
        let list = build_entries(&cities(), "RE", 3, None, None);
        assert!(list.typed_match.is_none());
        assert!(list.entries.iter().all(|e| !e.display.is_emphasized()));
    }

    #[test]
    fn only_first_match_becomes_typed_match_but_all_are_emphasized() {
        let list = build_entries(&cities(), "ent", 3, None, None);
        assert_eq!(list.typed_match.as_deref(), Some("3"));

        let list = build_entries(&cities(), "r", 1, None, None);
        assert_eq!(list.typed_match.as_deref(), Some("1"));
        assert!(list.entries.iter().all(|e| e.display.is_emphasized()));
    }

    #[test]
    fn short_text_falls_back_to_selection_then_first() {
        let list = build_entries(&cities(), "tu", 3, None, Some("3"));
        assert_eq!(list.highlighted.as_deref(), Some("3"));

        let list = build_entries(&cities(), "tu", 3, None, None);
        assert_eq!(list.highlighted.as_deref(), Some("1"));
    }

    #[test]
    fn selection_outside_rendered_set_falls_back_to_first() {
        let no_rome: FilterFn = Arc::new(|item: &Item| item.id != "1");
        let list = build_entries(&cities(), "", 3, Some(&no_rome), Some("1"));
        assert_eq!(list.highlighted.as_deref(), Some("2"));
    }

    #[test]
    fn unmatched_text_falls_back() {
        let list = build_entries(&cities(), "xyz", 3, None, Some("4"));
        assert!(list.typed_match.is_none());
        assert_eq!(list.highlighted.as_deref(), Some("4"));
    }

    #[test]
    fn empty_input_renders_nothing_highlighted() {
        let list = build_entries(&[], "rom", 3, None, None);
        assert!(list.entries.is_empty());
        assert!(list.highlighted.is_none());
    }

    #[test]
    fn find_is_case_insensitive_and_char_safe() {
        assert_eq!(find_case_insensitive("Turin", "TUR"), Some(0..3));
        assert_eq!(find_case_insensitive("Reggio Emilia", "emi"), Some(7..10));
        assert_eq!(find_case_insensitive("Forlì", "RLÌ"), Some(2..6));
        assert_eq!(find_case_insensitive("Ancona", "anz"), None);
        assert_eq!(find_case_insensitive("Bari", ""), None);
        assert_eq!(find_case_insensitive("Bo", "bologna"), None);
    }
}
