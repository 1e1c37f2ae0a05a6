//! Typed shapes for the Elasticsearch REST responses searchfs consumes.
//!
//! Decoding happens here and only here; the rest of the crate works with
//! `Vec<String>`, `u64` and id→bytes maps. The `_source` of each hit is kept
//! as raw JSON so document bytes round-trip verbatim.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::value::RawValue;

/// Response to `GET /_aliases`: a map from index name to its alias block.
/// Only the keys matter to us; the values stay opaque.
pub type AliasesResponse = HashMap<String, serde_json::Value>;

/// Per-index entry in a `GET /{index}/_mapping` response.
#[derive(Debug, Deserialize)]
pub struct MappingEnvelope {
    /// Document type name → mapping definition. The definitions are opaque;
    /// the keys are the type names.
    #[serde(default)]
    pub mappings: HashMap<String, serde_json::Value>,
}

/// Response to `GET /{index}/{type}/_count`.
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Response to `GET /{index}/{type}/_search`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// A single search hit. `_source` is absent when the document was stored
/// without source; such hits become empty files.
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Option<Box<RawValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_keys_are_index_names() {
        let body = r#"{"logs":{"aliases":{}},"metrics":{"aliases":{"m":{}}}}"#;
        let resp: AliasesResponse = serde_json::from_str(body).unwrap();
        let mut names: Vec<&str> = resp.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["logs", "metrics"]);
    }

    #[test]
    fn mapping_keys_are_doc_types() {
        let body = r#"{"logs":{"mappings":{"entry":{"properties":{}},"audit":{}}}}"#;
        let resp: HashMap<String, MappingEnvelope> = serde_json::from_str(body).unwrap();
        let mut types: Vec<&str> = resp["logs"].mappings.keys().map(String::as_str).collect();
        types.sort_unstable();
        assert_eq!(types, ["audit", "entry"]);
    }

    #[test]
    fn mapping_without_mappings_block_is_empty() {
        let body = r#"{"logs":{}}"#;
        let resp: HashMap<String, MappingEnvelope> = serde_json::from_str(body).unwrap();
        assert!(resp["logs"].mappings.is_empty());
    }

    #[test]
    fn count_decodes() {
        let body = r#"{"count":23,"_shards":{"total":5,"successful":5,"failed":0}}"#;
        let resp: CountResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.count, 23);
    }

    #[test]
    fn search_hits_keep_source_verbatim() {
        let body = r#"{"took":3,"hits":{"total":2,"hits":[
            {"_id":"a","_source":{"msg":"hello","n":1}},
            {"_id":"b"}
        ]}}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.hits.hits.len(), 2);
        assert_eq!(resp.hits.hits[0].id, "a");
        assert_eq!(
            resp.hits.hits[0].source.as_ref().unwrap().get(),
            r#"{"msg":"hello","n":1}"#
        );
        assert!(resp.hits.hits[1].source.is_none());
    }

    #[test]
    fn empty_search_response_decodes() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.hits.hits.is_empty());
    }
}
