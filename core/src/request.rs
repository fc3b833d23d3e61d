use std::borrow::Cow;
use std::mem;
use std::str::FromStr;
use std::time::Duration;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing snapshot of a request.
///
/// Built from `http::request::Parts` once every signed-over header has been
/// set. Signers read from it, add what they need and apply it back.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent encoded.
    pub path: String,
    /// HTTP query parameters, still percent encoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing snapshot from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    v.split('&')
                        .filter(|pair| !pair.is_empty())
                        .map(|pair| match pair.split_once('=') {
                            Some((k, v)) => (k.to_string(), v.to_string()),
                            None => (pair.to_string(), String::new()),
                        })
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing snapshot back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the path percent decoded.
    pub fn path_percent_decoded(&self) -> Cow<str> {
        percent_encoding::percent_decode_str(&self.path).decode_utf8_lossy()
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    ///
    /// The value must already be percent encoded.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get the percent decoded query pairs.
    pub fn query_percent_decoded(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(k, v)| {
                (
                    form_urlencoded_decode(k).into_owned(),
                    form_urlencoded_decode(v).into_owned(),
                )
            })
            .collect()
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get all headers whose name starts with prefix.
    ///
    /// Every header name shows up once. When a header carries several
    /// values they are concatenated in insertion order without separator.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();
        for name in self.headers.keys() {
            let name = name.as_str();
            if !name.starts_with(prefix) {
                continue;
            }

            let mut value = String::new();
            for v in self.headers.get_all(name) {
                value.push_str(v.to_str()?);
            }
            headers.push((name.to_lowercase(), value));
        }

        Ok(headers)
    }

    /// Convert sorted headers to string, every entry followed by `end`.
    ///
    /// ```shell
    /// [(c, d), (a, b)] => "a:b\nc:d\n"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, end: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (k, v) in headers {
            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
            s.push_str(end);
        }

        s
    }

    /// Convert sorted query to string, every entry preceded by `start`.
    ///
    /// ```shell
    /// [(c, d), (a, b)] => "\na:b\nc:d"
    /// ```
    pub fn query_to_string(mut query: Vec<(String, String)>, sep: &str, start: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via query name.
        query.sort();

        for (k, v) in query {
            s.push_str(start);
            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

/// Decode a query component, treating `+` as space like the service does.
fn form_urlencoded_decode(s: &str) -> Cow<str> {
    if !s.contains('+') {
        return percent_encoding::percent_decode_str(s).decode_utf8_lossy();
    }

    let replaced = s.replace('+', " ");
    Cow::Owned(
        percent_encoding::percent_decode_str(&replaced)
            .decode_utf8_lossy()
            .into_owned(),
    )
}

/// SigningMethod is the method that used in signing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query.
    Query(Duration),
}
