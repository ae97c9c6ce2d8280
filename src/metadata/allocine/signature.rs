//! Request signing for the AlloCiné REST API.
//!
//! Every request carries a `sed` parameter (the current date as `YYYYMMDD`)
//! and a `sig` parameter: the base64-encoded SHA-1 digest of
//! `path + encoded_params + secret`. The parameters are encoded in insertion
//! order, so two requests built with the same parameters in the same order
//! always share the same signature for a given date.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::{Digest, Sha1};

/// Insertion-ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping insertion order.
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-encode the parameters the way the signature expects them.
    pub fn encode(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", quote_plus(k), quote_plus(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A signed query string, ready to be set on a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    /// Encoded parameters including `sed`, as covered by the signature.
    pub signed: String,
    /// Base64 signature.
    pub sig: String,
}

impl SignedQuery {
    /// Full query string: the signed parameters followed by `sig`.
    pub fn query_string(&self) -> String {
        format!("{}&sig={}", self.signed, quote_plus(&self.sig))
    }
}

/// Sign `params` for `path` on `date` with the shared `secret`.
pub fn sign(path: &str, params: &Params, secret: &str, date: NaiveDate) -> SignedQuery {
    let params = params.clone().push("sed", date.format("%Y%m%d"));
    let signed = params.encode();

    let mut hasher = Sha1::new();
    hasher.update(path.as_bytes());
    hasher.update(signed.as_bytes());
    hasher.update(secret.as_bytes());
    let sig = STANDARD.encode(hasher.finalize());

    SignedQuery { signed, sig }
}

/// Bytes escaped in form values: everything but ASCII alphanumerics and
/// `-_.~`.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encoding for form values: space becomes `+`, unreserved
/// characters are kept, everything else is `%XX`-escaped.
pub fn quote_plus(s: &str) -> String {
    // a literal `%` is escaped to `%25`, so `%20` can only come from a space
    utf8_percent_encode(s, FORM_VALUE)
        .to_string()
        .replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, 17).unwrap()
    }

    fn movie_params(code: u64) -> Params {
        Params::new()
            .push("code", code)
            .push("format", "json")
            .push("partner", "100ED1DA33EB")
            .push("profile", "large")
            .push("striptags", "synopsis,synopsisshort")
    }

    #[test]
    fn encoding_keeps_insertion_order() {
        let params = Params::new().push("count", 9999).push("filter", "movie").push("q", "la haine");
        assert_eq!(params.encode(), "count=9999&filter=movie&q=la+haine");
    }

    #[test]
    fn quote_plus_escapes() {
        assert_eq!(quote_plus("hello world"), "hello+world");
        assert_eq!(quote_plus("synopsis,synopsisshort"), "synopsis%2Csynopsisshort");
        assert_eq!(quote_plus("a+b/c="), "a%2Bb%2Fc%3D");
        assert_eq!(quote_plus("Amélie"), "Am%C3%A9lie");
        assert_eq!(quote_plus("~keep-_."), "~keep-_.");
        assert_eq!(quote_plus("100% *"), "100%25+%2A");
        assert_eq!(quote_plus("%20"), "%2520");
    }

    #[test]
    fn signed_string_appends_sed() {
        let signed = sign("movie", &movie_params(27405), "secret", date());
        assert!(signed.signed.ends_with("&sed=20200517"));
        assert!(signed.signed.starts_with("code=27405&format=json"));
    }

    #[test]
    fn signature_matches_sha1_of_path_params_secret() {
        let signed = sign("search", &Params::new().push("q", "x"), "s3cr3t", date());
        let mut hasher = Sha1::new();
        hasher.update(b"searchq=x&sed=20200517s3cr3t");
        assert_eq!(signed.sig, STANDARD.encode(hasher.finalize()));
        // base64 of a 20-byte digest
        assert_eq!(signed.sig.len(), 28);
    }

    #[test]
    fn signature_is_deterministic() {
        let a = sign("movie", &movie_params(27405), "secret", date());
        let b = sign("movie", &movie_params(27405), "secret", date());
        assert_eq!(a, b);
    }

    #[test]
    fn signature_changes_with_any_input() {
        let base = sign("movie", &movie_params(27405), "secret", date());
        assert_ne!(base.sig, sign("movie", &movie_params(27406), "secret", date()).sig);
        assert_ne!(base.sig, sign("media", &movie_params(27405), "secret", date()).sig);
        assert_ne!(base.sig, sign("movie", &movie_params(27405), "other", date()).sig);
        let next_day = NaiveDate::from_ymd_opt(2020, 5, 18).unwrap();
        assert_ne!(base.sig, sign("movie", &movie_params(27405), "secret", next_day).sig);
    }

    #[test]
    fn parameter_order_matters() {
        let ab = Params::new().push("a", 1).push("b", 2);
        let ba = Params::new().push("b", 2).push("a", 1);
        assert_ne!(
            sign("movie", &ab, "secret", date()).sig,
            sign("movie", &ba, "secret", date()).sig
        );
    }

    #[test]
    fn query_string_encodes_signature() {
        let signed = SignedQuery {
            signed: "q=x&sed=20200517".into(),
            sig: "ab+/cd==".into(),
        };
        assert_eq!(signed.query_string(), "q=x&sed=20200517&sig=ab%2B%2Fcd%3D%3D");
    }
}
