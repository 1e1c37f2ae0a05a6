//! Blocking Elasticsearch client implementing [`DocumentStore`].

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use url::Url;

use crate::store::DocumentStore;
use crate::wire::{AliasesResponse, CountResponse, MappingEnvelope, SearchResponse};
use crate::Error;

/// A [`DocumentStore`] backed by the Elasticsearch REST API.
///
/// Takes one or more endpoint URLs. Requests go to the first endpoint;
/// connection-level failures (refused, timed out) fall through to the next
/// one. HTTP-level errors are answers, not outages, and are returned
/// immediately without trying other endpoints.
#[derive(Debug)]
pub struct EsClient {
    client: reqwest::blocking::Client,
    endpoints: Vec<Url>,
}

impl EsClient {
    /// Create a client from endpoint base URLs.
    pub fn new<S: AsRef<str>>(urls: &[S]) -> Result<Self, Error> {
        if urls.is_empty() {
            return Err(Error::NoEndpoints);
        }
        let mut endpoints = Vec::with_capacity(urls.len());
        for url in urls {
            let mut url = Url::parse(url.as_ref())?;
            // A trailing slash keeps Url::join from eating the last path
            // segment of prefixed endpoints.
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            endpoints.push(url);
        }
        Ok(Self {
            client: reqwest::blocking::Client::new(),
            endpoints,
        })
    }

    /// Create a client from a comma-separated endpoint list, e.g.
    /// `"http://es1:9200,http://es2:9200"`.
    pub fn from_url_list(urls: &str) -> Result<Self, Error> {
        let urls: Vec<&str> = urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .collect();
        Self::new(&urls)
    }

    /// GET `path` (relative to the endpoint base) and decode the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let mut last_err = None;
        for base in &self.endpoints {
            let url = base.join(path)?;
            log::debug!("GET {url}");
            let mut request = self.client.get(url);
            if !query.is_empty() {
                request = request.query(query);
            }
            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text()?;
                    if !status.is_success() {
                        return Err(Error::Status {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    return Ok(serde_json::from_str(&body)?);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    log::warn!("endpoint {base} unreachable: {e}");
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err.map(Error::Http).unwrap_or(Error::NoEndpoints))
    }
}

impl DocumentStore for EsClient {
    fn index_names(&self) -> Result<Vec<String>, Error> {
        let aliases: AliasesResponse = self.get_json("_aliases", &[])?;
        Ok(aliases.into_keys().collect())
    }

    fn doc_types(&self, index: &str) -> Result<Vec<String>, Error> {
        let mut mappings: HashMap<String, MappingEnvelope> =
            self.get_json(&format!("{index}/_mapping"), &[])?;
        Ok(mappings
            .remove(index)
            .map(|envelope| envelope.mappings.into_keys().collect())
            .unwrap_or_default())
    }

    fn count_docs(&self, index: &str, doc_type: &str) -> Result<u64, Error> {
        let response: CountResponse = self.get_json(&format!("{index}/{doc_type}/_count"), &[])?;
        Ok(response.count)
    }

    fn fetch_docs(
        &self,
        index: &str,
        doc_type: &str,
        from: u64,
        size: u64,
    ) -> Result<HashMap<String, Bytes>, Error> {
        let response: SearchResponse = self.get_json(
            &format!("{index}/{doc_type}/_search"),
            &[("from", from.to_string()), ("size", size.to_string())],
        )?;
        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let source = hit
                    .source
                    .map(|raw| Bytes::copy_from_slice(raw.get().as_bytes()))
                    .unwrap_or_default();
                (hit.id, source)
            })
            .collect())
    }
}
