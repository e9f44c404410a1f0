//! services/api/src/adapters/wikipedia.rs
//!
//! Encyclopedic adapter backed by the Wikipedia REST API (summaries and page
//! sections) and the Wikidata SPARQL endpoint (structured facts). Implements
//! the `EncyclopediaProvider` port; every sub-fetch degrades to `None` on any
//! failure so enrichment never takes a turn down.

use async_trait::async_trait;
use movie_tracker_core::domain::{EntityKind, StructuredFacts};
use movie_tracker_core::ports::EncyclopediaProvider;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const WIKIPEDIA_REST_BASE: &str = "https://en.wikipedia.org/api/rest_v1";
const WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";

/// Sections shorter than this after cleanup carry too little signal to keep.
const MIN_SECTION_LEN: usize = 50;
/// Cleaned section text is clamped to this many characters for chat context.
const MAX_SECTION_LEN: usize = 500;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct WikipediaAdapter {
    http: reqwest::Client,
    rest_base: String,
    sparql_url: String,
    citation_re: Regex,
    whitespace_re: Regex,
}

impl WikipediaAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            rest_base: WIKIPEDIA_REST_BASE.to_string(),
            sparql_url: WIKIDATA_SPARQL_URL.to_string(),
            citation_re: Regex::new(r"\[\d+\]").unwrap(),
            whitespace_re: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Points the adapter at different hosts. Used by tests.
    pub fn with_endpoints(
        mut self,
        rest_base: impl Into<String>,
        sparql_url: impl Into<String>,
    ) -> Self {
        self.rest_base = rest_base.into();
        self.sparql_url = sparql_url.into();
        self
    }

    /// Removes citation markers, collapses whitespace, and clamps the text to
    /// a chat-friendly length.
    fn clean_text(&self, text: &str) -> String {
        let text = self.citation_re.replace_all(text, "");
        let text = self.whitespace_re.replace_all(&text, " ");
        let text = text.trim();
        if text.len() > MAX_SECTION_LEN {
            let cut = text
                .char_indices()
                .take_while(|(i, _)| *i <= MAX_SECTION_LEN - 3)
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            format!("{}...", &text[..cut])
        } else {
            text.to_string()
        }
    }

    /// Builds a REST URL by appending `parts` as path segments, so reserved
    /// characters and non-ASCII in titles are percent-encoded.
    fn page_url(&self, parts: &[&str]) -> Option<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.rest_base).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().extend(parts);
        Some(url)
    }

    async fn fetch_section(&self, entity_name: &str, section_name: &str) -> Option<String> {
        let url =
            self.page_url(&["page", "sections", &encode_title(entity_name), section_name])?;
        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let section: SectionResponse = response.json().await.ok()?;
        let clean = self.clean_text(&section.text?);
        (clean.len() > MIN_SECTION_LEN).then_some(clean)
    }
}

/// Wikipedia page titles use underscores where the display name has spaces.
fn encode_title(entity_name: &str) -> String {
    entity_name.replace(' ', "_")
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct SummaryResponse {
    extract: Option<String>,
}

#[derive(Deserialize)]
struct SectionResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Deserialize)]
struct SparqlValue {
    value: Option<String>,
}

//=========================================================================================
// SPARQL Queries and Binding Extraction
//=========================================================================================

fn escape_label(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

fn movie_query(title: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?item ?itemLabel ?director ?directorLabel ?releaseDate ?boxOffice WHERE {{
  ?item wdt:P31 wd:Q11424.
  ?item rdfs:label "{}"@en.
  OPTIONAL {{ ?item wdt:P57 ?director. }}
  OPTIONAL {{ ?item wdt:P577 ?releaseDate. }}
  OPTIONAL {{ ?item wdt:P2142 ?boxOffice. }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT 10"#,
        escape_label(title)
    )
}

fn actor_query(name: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?item ?itemLabel ?birthDate ?birthPlace ?birthPlaceLabel ?occupation ?occupationLabel ?movies WHERE {{
  ?item wdt:P31 wd:Q5.
  ?item rdfs:label "{}"@en.
  ?item wdt:P106 ?occupation.
  FILTER(?occupation IN (wd:Q33999, wd:Q10800557, wd:Q2259451))
  OPTIONAL {{ ?item wdt:P569 ?birthDate. }}
  OPTIONAL {{ ?item wdt:P19 ?birthPlace. }}
  OPTIONAL {{
    SELECT (COUNT(?movie) as ?movies) WHERE {{
      ?movie wdt:P31 wd:Q11424.
      ?movie wdt:P161 ?item.
    }}
  }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT 10"#,
        escape_label(name)
    )
}

fn director_query(name: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?item ?itemLabel ?birthDate ?birthPlace ?birthPlaceLabel ?movies ?awards WHERE {{
  ?item wdt:P31 wd:Q5.
  ?item rdfs:label "{}"@en.
  ?item wdt:P106 wd:Q2526255.
  OPTIONAL {{ ?item wdt:P569 ?birthDate. }}
  OPTIONAL {{ ?item wdt:P19 ?birthPlace. }}
  OPTIONAL {{
    SELECT (COUNT(?movie) as ?movies) WHERE {{
      ?movie wdt:P31 wd:Q11424.
      ?movie wdt:P57 ?item.
    }}
  }}
  OPTIONAL {{
    SELECT (COUNT(?award) as ?awards) WHERE {{
      ?item wdt:P166 ?award.
    }}
  }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT 10"#,
        escape_label(name)
    )
}

fn sparql_query_for(entity_name: &str, kind: EntityKind) -> String {
    match kind {
        EntityKind::Movie => movie_query(entity_name),
        EntityKind::Actor => actor_query(entity_name),
        EntityKind::Director => director_query(entity_name),
    }
}

fn section_names_for(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Movie => &["Plot", "Production", "Reception", "Legacy", "Box office"],
        EntityKind::Actor => &["Early life", "Career", "Personal life", "Filmography"],
        EntityKind::Director => &["Early life", "Career", "Style", "Filmography", "Awards"],
    }
}

fn binding_value(binding: &HashMap<String, SparqlValue>, var: &str) -> Option<String> {
    binding.get(var).and_then(|v| v.value.clone())
}

/// Wikidata dates come back as full ISO timestamps; keep the date part.
fn date_part(value: &str) -> String {
    value.chars().take(10).collect()
}

fn extract_facts(
    bindings: &[HashMap<String, SparqlValue>],
    kind: EntityKind,
) -> StructuredFacts {
    let mut facts = BTreeMap::new();
    let mut related_entities: Vec<String> = Vec::new();

    for binding in bindings {
        match kind {
            EntityKind::Movie => {
                if let Some(director) = binding_value(binding, "directorLabel") {
                    if !related_entities.contains(&director) {
                        related_entities.push(director.clone());
                    }
                    facts.insert("Director".to_string(), director);
                }
                if let Some(date) = binding_value(binding, "releaseDate") {
                    facts.insert("Release Date".to_string(), date_part(&date));
                }
                if let Some(box_office) = binding_value(binding, "boxOffice") {
                    facts.insert("Box Office".to_string(), box_office);
                }
            }
            EntityKind::Actor => {
                if let Some(date) = binding_value(binding, "birthDate") {
                    facts.insert("Birth Date".to_string(), date_part(&date));
                }
                if let Some(place) = binding_value(binding, "birthPlaceLabel") {
                    facts.insert("Birth Place".to_string(), place);
                }
                if let Some(count) = binding_value(binding, "movies") {
                    facts.insert("Movie Count".to_string(), count);
                }
            }
            EntityKind::Director => {
                if let Some(date) = binding_value(binding, "birthDate") {
                    facts.insert("Birth Date".to_string(), date_part(&date));
                }
                if let Some(place) = binding_value(binding, "birthPlaceLabel") {
                    facts.insert("Birth Place".to_string(), place);
                }
                if let Some(count) = binding_value(binding, "movies") {
                    facts.insert("Movies Directed".to_string(), count);
                }
                if let Some(count) = binding_value(binding, "awards") {
                    facts.insert("Awards".to_string(), count);
                }
            }
        }
    }

    StructuredFacts {
        facts,
        related_entities,
    }
}

//=========================================================================================
// `EncyclopediaProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl EncyclopediaProvider for WikipediaAdapter {
    async fn page_summary(&self, entity_name: &str) -> Option<String> {
        let url = self.page_url(&["page", "summary", &encode_title(entity_name)])?;
        debug!(entity = entity_name, "wikipedia summary request");
        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let summary: SummaryResponse = response.json().await.ok()?;
        summary.extract
    }

    async fn structured_facts(
        &self,
        entity_name: &str,
        kind: EntityKind,
    ) -> Option<StructuredFacts> {
        let query = sparql_query_for(entity_name, kind);
        debug!(entity = entity_name, "wikidata sparql request");
        let response = self
            .http
            .post(&self.sparql_url)
            .form(&[("query", query.as_str()), ("format", "json")])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let parsed: SparqlResponse = response.json().await.ok()?;
        if parsed.results.bindings.is_empty() {
            return None;
        }
        Some(extract_facts(&parsed.results.bindings, kind))
    }

    async fn relevant_sections(
        &self,
        entity_name: &str,
        kind: EntityKind,
    ) -> Option<BTreeMap<String, String>> {
        let mut sections = BTreeMap::new();
        for section_name in section_names_for(kind) {
            if let Some(text) = self.fetch_section(entity_name, section_name).await {
                sections.insert(section_name.to_string(), text);
            }
        }
        (!sections.is_empty()).then_some(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> WikipediaAdapter {
        WikipediaAdapter::new(reqwest::Client::new())
    }

    #[test]
    fn cleanup_strips_citations_and_collapses_whitespace() {
        let cleaned = adapter().clean_text("A thief[1]  who steals\n\ncorporate[12] secrets.");
        assert_eq!(cleaned, "A thief who steals corporate secrets.");
    }

    #[test]
    fn cleanup_clamps_long_sections_with_ellipsis() {
        let long = "x".repeat(600);
        let cleaned = adapter().clean_text(&long);
        assert_eq!(cleaned.len(), MAX_SECTION_LEN);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn page_urls_percent_encode_reserved_characters() {
        let url = adapter()
            .page_url(&["page", "summary", &encode_title("Who Framed Roger Rabbit? #1")])
            .unwrap();
        let rendered = url.as_str();
        assert!(rendered.starts_with("https://en.wikipedia.org/api/rest_v1/page/summary/"));
        assert!(rendered.contains("Who_Framed_Roger_Rabbit%3F"));
        assert!(rendered.contains("%231"));
        assert!(!rendered.contains('?'));
        assert!(!rendered.contains('#'));
    }

    #[test]
    fn page_urls_percent_encode_non_ascii_titles() {
        let url = adapter()
            .page_url(&["page", "summary", &encode_title("Amélie")])
            .unwrap();
        assert!(url.as_str().ends_with("/page/summary/Am%C3%A9lie"));
    }

    #[test]
    fn section_urls_keep_title_and_section_as_separate_segments() {
        let url = adapter()
            .page_url(&["page", "sections", &encode_title("Tom Hanks"), "Early life"])
            .unwrap();
        assert!(url
            .as_str()
            .ends_with("/page/sections/Tom_Hanks/Early%20life"));
    }

    #[test]
    fn movie_bindings_extract_director_release_and_box_office() {
        let parsed: SparqlResponse = serde_json::from_str(
            r#"{
                "results": {
                    "bindings": [{
                        "directorLabel": { "value": "Christopher Nolan" },
                        "releaseDate": { "value": "2010-07-16T00:00:00Z" },
                        "boxOffice": { "value": "836836967" }
                    }]
                }
            }"#,
        )
        .unwrap();

        let facts = extract_facts(&parsed.results.bindings, EntityKind::Movie);
        assert_eq!(facts.facts.get("Director").map(String::as_str), Some("Christopher Nolan"));
        assert_eq!(facts.facts.get("Release Date").map(String::as_str), Some("2010-07-16"));
        assert_eq!(facts.facts.get("Box Office").map(String::as_str), Some("836836967"));
        assert_eq!(facts.related_entities, vec!["Christopher Nolan"]);
    }

    #[test]
    fn duplicate_directors_are_related_once() {
        let binding = |name: &str| {
            HashMap::from([(
                "directorLabel".to_string(),
                SparqlValue { value: Some(name.to_string()) },
            )])
        };
        let facts = extract_facts(
            &[binding("Christopher Nolan"), binding("Christopher Nolan")],
            EntityKind::Movie,
        );
        assert_eq!(facts.related_entities.len(), 1);
    }

    #[test]
    fn label_quotes_are_escaped_in_queries() {
        let query = movie_query(r#"The "Movie""#);
        assert!(query.contains(r#"rdfs:label "The \"Movie\""@en"#));
    }

    #[test]
    fn section_lists_differ_by_entity_kind() {
        assert!(section_names_for(EntityKind::Movie).contains(&"Plot"));
        assert!(section_names_for(EntityKind::Actor).contains(&"Filmography"));
        assert!(section_names_for(EntityKind::Director).contains(&"Style"));
    }
}
