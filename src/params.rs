//! Path parameters and their request-scoped storage.
//!
//! The router extracts `:name` segments on every match. Rather than thread
//! them through every middleware signature, the terminal stage drops them
//! into the request's [`http::Extensions`] right before calling the handler.
//! The extension key is [`Attached`], a private newtype: nothing outside
//! this crate can name it, so nothing outside this crate can read or clobber
//! the set except through [`Request::params`](crate::Request::params).

use percent_encoding::percent_decode_str;

/// Named path parameters extracted by the router for one request.
///
/// Order follows the pattern, left to right. For `/users/:id/posts/:post`
/// matched against `/users/7/posts/42` this holds `[("id", "7"), ("post", "42")]`.
/// Values are percent-decoded: `/api/echo/hip%20hop` yields `hip hop`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

pub(crate) static EMPTY: Params = Params(Vec::new());

impl Params {
    /// Value of `name`, or `None` if the matched pattern has no such segment.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `name`, or `""` if absent.
    pub fn by_name(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'k, 'v> From<matchit::Params<'k, 'v>> for Params {
    fn from(params: matchit::Params<'k, 'v>) -> Self {
        Self(params.iter().map(|(k, v)| (k.to_owned(), decode(v))).collect())
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Invalid UTF-8 after decoding is replaced, not rejected.
fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Extension key. Private so the set can only be attached by dispatch.
#[derive(Clone)]
pub(crate) struct Attached(pub(crate) Params);
