use crate::models::ListingDocument;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static GEO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"else\{lat_o='([^']+)';lng_o='([^']+)';\}").expect("valid geolocation pattern")
});
static DASH_OR_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]+").expect("valid separator pattern"));
static NOT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ]+").expect("valid filter pattern"));

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Turn a table label such as "Saleable Area (ft²)" into `saleable_area_ft`
pub fn to_snake_case(label: &str) -> String {
    let spaced = DASH_OR_SPACE.replace_all(label.trim(), " ");
    let cleaned = NOT_WORD.replace_all(&spaced, "");
    cleaned.to_lowercase().replace(' ', "_")
}

/// Text nodes under `el`, skipping script and style bodies
fn text_nodes<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let in_script = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| matches!(e.name(), "script" | "style")))
            .unwrap_or(false);
        if in_script {
            None
        } else {
            Some(&**text)
        }
    })
}

/// Trimmed text nodes joined with single spaces
fn spaced_text(el: ElementRef<'_>) -> String {
    text_nodes(el)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed text nodes concatenated
fn compact_text(el: ElementRef<'_>) -> String {
    text_nodes(el).map(str::trim).collect()
}

/// Extract a listing document from a detail page.
///
/// Returns `None` when the page lacks the valid-listing marker.
pub fn parse_listing(html: &str) -> Option<ListingDocument> {
    let document = Html::parse_document(html);

    let marker = document.select(&selector(".ui.large.message")).next()?;
    let mut doc = ListingDocument::default();

    if let Some(header) = marker.select(&selector("div.header")).next() {
        doc.set_field("title".into(), spaced_text(header));
    }
    if let Some(description) = marker.select(&selector("#desc_normal")).next() {
        doc.set_field("description".into(), spaced_text(description));
    }

    for (key, value) in table_pairs(&document) {
        doc.set_field(key, value);
    }

    match geolocation(&document) {
        Some((lat, lng)) => {
            doc.set_field("latitude".into(), lat);
            doc.set_field("longitude".into(), lng);
        }
        None => debug!("No geolocation data"),
    }

    if let Some(entry_date) = estate_entry_date(&document) {
        doc.set_field("estate_entry_date".into(), entry_date);
    }
    if let Some(age) = building_age(&document) {
        doc.set_field("building_age".into(), age);
    }

    Some(doc)
}

/// Label/value pairs from every `.tablePair` block
fn table_pairs(document: &Html) -> Vec<(String, String)> {
    let left = selector(".table_left");
    let right = selector(".table_right");
    let mut pairs = Vec::new();

    for table in document.select(&selector(".tablePair")) {
        let keys = table.select(&left).map(|el| to_snake_case(&compact_text(el)));
        let values = table.select(&right).map(compact_text);
        pairs.extend(keys.zip(values).filter(|(k, _)| !k.is_empty()));
    }

    pairs
}

/// Latitude and longitude from the inline map script
fn geolocation(document: &Html) -> Option<(String, String)> {
    document.select(&selector("script")).find_map(|script| {
        let source: String = script
            .text()
            .flat_map(str::chars)
            .filter(|c| !c.is_whitespace())
            .collect();
        GEO_PATTERN
            .captures(&source)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
    })
}

fn estate_entry_date(document: &Html) -> Option<String> {
    let label = document
        .select(&selector("td"))
        .find(|td| compact_text(*td) == "Estate Entry Date")?;

    let value = label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "td")
        .map(compact_text)?;

    (!value.is_empty()).then_some(value)
}

fn building_age(document: &Html) -> Option<String> {
    let div = document
        .select(&selector("div.pairSubValue"))
        .find(|div| compact_text(*div).contains("Building age"))?;

    let age = compact_text(div).replace("Building age: ", "").replace("Building age:", "");
    (!age.is_empty()).then_some(age)
}
