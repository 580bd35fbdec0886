use std::borrow::Cow;

use crate::catalog::{Episode, Show};
use crate::format::strip_markup;

/// An entity that exposes the text fields a search term is matched against
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Show {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = Vec::with_capacity(self.genres.len() + 2);
        fields.push(Cow::Borrowed(self.name.as_str()));
        fields.extend(self.genres.iter().map(|g| Cow::Borrowed(g.as_str())));
        if let Some(summary) = &self.summary {
            fields.push(Cow::Owned(strip_markup(summary)));
        }
        fields
    }
}

impl Searchable for Episode {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        if let Some(summary) = &self.summary {
            fields.push(Cow::Owned(strip_markup(summary)));
        }
        fields
    }
}

/// Case-insensitive substring match against any designated field.
/// `needle` must already be lowercased.
fn matches<T: Searchable>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Keep the items matching `term`, in their original order.
/// A blank term keeps everything.
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    if term.trim().is_empty() {
        return items.iter().collect();
    }
    let needle = term.to_lowercase();
    items.iter().filter(|item| matches(*item, &needle)).collect()
}
