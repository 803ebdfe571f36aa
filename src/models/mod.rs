use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque identifier of one listing, compared by exact string equality
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Set of listing IDs. Backed by a `BTreeSet` so iteration and serialization
/// are always in sorted order, whatever the insertion order was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(BTreeSet<ListingId>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the line-oriented ledger format. Only the line terminator is
    /// stripped, so IDs read back exactly as they were written. Blank and
    /// whitespace-only lines are ignored.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(ListingId::from)
            .collect()
    }

    /// Serialize as one ID per line, sorted, newline-terminated.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for id in &self.0 {
            out.push_str(id.as_str());
            out.push('\n');
        }
        out
    }

    pub fn insert(&mut self, id: ListingId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ListingId> {
        self.0.iter()
    }

    /// Elements of `self` that are not in `other`
    pub fn difference(&self, other: &IdSet) -> IdSet {
        self.0.difference(&other.0).cloned().collect()
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        self.0.union(&other.0).cloned().collect()
    }
}

impl FromIterator<ListingId> for IdSet {
    fn from_iter<I: IntoIterator<Item = ListingId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ListingId> for IdSet {
    fn extend<I: IntoIterator<Item = ListingId>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for IdSet {
    type Item = ListingId;
    type IntoIter = btree_set::IntoIter<ListingId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a ListingId;
    type IntoIter = btree_set::Iter<'a, ListingId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One scraped listing detail page.
///
/// The known fields are typed; anything else the page's property table
/// carries lands in `extra` under its snake_case label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estate_entry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_age: Option<String>,
}

impl ListingDocument {
    /// Set a field by name, routing known names to their typed slot
    pub fn set_field(&mut self, key: String, value: String) {
        match key.as_str() {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "latitude" => self.latitude = Some(value),
            "longitude" => self.longitude = Some(value),
            "estate_entry_date" => self.estate_entry_date = Some(value),
            "building_age" => self.building_age = Some(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Pretty JSON with 4-space indentation
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Generators for listing IDs and ID sets
#[cfg(test)]
pub(crate) mod strategies {
    use super::{IdSet, ListingId};
    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;

    /// IDs as the index may emit them, padding included, never blank
    pub fn listing_id() -> impl Strategy<Value = ListingId> {
        "[ A-Za-z0-9_-]{0,4}[A-Za-z0-9][ A-Za-z0-9_-]{0,4}"
            .prop_map(|id: String| ListingId::from(id))
    }

    pub fn id_set() -> impl Strategy<Value = IdSet> {
        btree_set(listing_id(), 0..24).prop_map(|ids| ids.into_iter().collect::<IdSet>())
    }

    /// A list of IDs (with repeats) and a shuffled copy of it
    pub fn id_list_and_shuffle() -> impl Strategy<Value = (Vec<ListingId>, Vec<ListingId>)> {
        vec(listing_id(), 0..24)
            .prop_flat_map(|ids| (Just(ids.clone()), Just(ids).prop_shuffle()))
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::{id_list_and_shuffle, id_set};
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn serialization_ignores_insertion_order((ids, shuffled) in id_list_and_shuffle()) {
            let a: IdSet = ids.into_iter().collect();
            let b: IdSet = shuffled.into_iter().collect();
            prop_assert_eq!(a.to_text(), b.to_text());
        }

        #[test]
        fn parse_reads_back_what_was_written(set in id_set()) {
            prop_assert_eq!(IdSet::parse(&set.to_text()), set);
        }
    }

    fn ids(items: &[&str]) -> IdSet {
        items.iter().map(|s| ListingId::from(*s)).collect()
    }

    #[test]
    fn serialization_is_sorted_regardless_of_insertion_order() {
        let a = ids(&["C", "A", "B"]);
        let b = ids(&["B", "C", "A", "A"]);
        assert_eq!(a.to_text(), "A\nB\nC\n");
        assert_eq!(a.to_text(), b.to_text());
    }

    #[test]
    fn parse_skips_blank_lines_and_keeps_ids_exact() {
        let set = IdSet::parse(" 123\n\n   \n456\r\n123\n");
        assert_eq!(set, ids(&[" 123", "123", "456"]));
    }

    #[test]
    fn padded_id_survives_a_ledger_round_trip() {
        let written = ids(&[" 123", "77 "]);
        let read = IdSet::parse(&written.to_text());
        assert_eq!(read, written);
        assert!(read.contains(&ListingId::from(" 123")));
    }

    #[test]
    fn parse_of_empty_text_is_empty() {
        assert!(IdSet::parse("").is_empty());
        assert_eq!(IdSet::new().to_text(), "");
    }

    #[test]
    fn set_field_routes_known_keys() {
        let mut doc = ListingDocument::default();
        doc.set_field("title".into(), "Nice flat".into());
        doc.set_field("building_age".into(), "12 years".into());
        doc.set_field("saleable_area".into(), "400 ft²".into());

        assert_eq!(doc.title.as_deref(), Some("Nice flat"));
        assert_eq!(doc.building_age.as_deref(), Some("12 years"));
        assert_eq!(doc.extra.get("saleable_area").map(String::as_str), Some("400 ft²"));
    }

    #[test]
    fn document_json_is_flat() {
        let mut doc = ListingDocument::default();
        doc.set_field("title".into(), "T".into());
        doc.set_field("rent".into(), "HKD 12,000".into());

        let json = doc.to_json().unwrap();
        assert!(json.contains("\n    \"title\": \"T\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rent"], "HKD 12,000");
        assert!(value.get("latitude").is_none());

        let back: ListingDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
