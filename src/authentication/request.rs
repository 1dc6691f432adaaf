use serde::{Deserialize, Serialize};
use url::Url;

/// An HTTP request about to be sent to a third-party system.
///
/// Query parameters and headers keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub query_params: Vec<(String, String)>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a query parameter, replacing any parameter of the same name in place.
    ///
    /// A parameter already present in the query of `url` is rewritten there, so
    /// the final URL carries the name exactly once.
    pub fn set_query_param(&mut self, name: &str, value: String) {
        if self.replace_in_url_query(name, &value) {
            self.query_params.retain(|(k, _)| k != name);
            return;
        }
        match self.query_params.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value,
            None => self.query_params.push((name.to_string(), value)),
        }
    }

    fn replace_in_url_query(&mut self, name: &str, value: &str) -> bool {
        let Ok(mut url) = Url::parse(&self.url) else {
            return false;
        };
        if !url.query_pairs().any(|(k, _)| k == name) {
            return false;
        }

        let mut replaced = false;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter_map(|(k, v)| {
                if k != name {
                    return Some((k.into_owned(), v.into_owned()));
                }
                if replaced {
                    return None;
                }
                replaced = true;
                Some((k.into_owned(), value.to_string()))
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        self.url = url.to_string();
        true
    }

    /// Sets a header, replacing any header whose name matches case-insensitively.
    pub fn set_header(&mut self, name: &str, value: String) {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(existing) => *existing = (name.to_string(), value),
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The full URL with `query_params` appended to any query already in `url`.
    pub fn full_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.url)?;
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query_params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}
