//! The `Query` struct used to parse, inspect and rewrite a URL query string.
//!
/// ```text
/// URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
/// ```
///
/// The query is kept as the list of its raw `&`-separated params. Nothing is
/// decoded or normalised, so converting it back to a string gives the exact
/// input, except for the params that were explicitly replaced.
use std::borrow::Cow;
use std::str::FromStr;

use percent_encoding::percent_decode_str;

/// It represents a URL query component.
///
/// ```rust
/// use torrust_announce_proxy::servers::proxy::query::Query;
///
/// let query = "info_hash=%3B%24U&peer_id=-qB00000000000000001&port=17548".parse::<Query>().unwrap();
///
/// assert!(query.contains_all(&["peer_id", "info_hash", "port"]));
/// assert_eq!(query.get_param("port"), Some("17548"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    params: Vec<Param>,
}

impl Query {
    /// It returns the raw value of the first param with the given `name`.
    ///
    /// A param without `=` has an empty value.
    ///
    /// ```rust
    /// use torrust_announce_proxy::servers::proxy::query::Query;
    ///
    /// let query = "port=1111&port=2222".parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("port"), Some("1111"));
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.has_name(name))
            .map(|param| param.value.as_deref().unwrap_or_default())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.has_name(name))
    }

    /// Presence test for a set of param names. Values are not inspected.
    #[must_use]
    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.contains(name))
    }

    /// It replaces the value of the **first** param with the given `name`
    /// and leaves the rest of the query untouched, including any later param
    /// with the same name.
    ///
    /// The name is kept as it was written. Returns the previous raw value or
    /// `None` if there is no such param (in which case nothing changes).
    ///
    /// ```rust
    /// use torrust_announce_proxy::servers::proxy::query::Query;
    ///
    /// let mut query = "a=1111&port=1111&b=port%3D1111".parse::<Query>().unwrap();
    ///
    /// query.replace_first("port", "51413");
    ///
    /// assert_eq!(query.to_string(), "a=1111&port=51413&b=port%3D1111");
    /// ```
    pub fn replace_first(&mut self, name: &str, value: &str) -> Option<String> {
        let param = self.params.iter_mut().find(|param| param.has_name(name))?;

        let previous = param.value.replace(value.to_owned());

        Some(previous.unwrap_or_default())
    }
}

/// Parsing never fails: any string is a valid query for this purpose.
impl FromStr for Query {
    type Err = std::convert::Infallible;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let params = raw_query.split('&').map(Param::from_raw).collect::<Vec<Param>>();

        Ok(Self { params })
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = self.params.iter().map(ToString::to_string).collect::<Vec<String>>().join("&");

        write!(f, "{query}")
    }
}

/// One `name[=value]` segment of the query, exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    name: String,
    value: Option<String>,
}

impl Param {
    fn from_raw(raw_param: &str) -> Self {
        match raw_param.split_once('=') {
            Some((name, value)) => Self {
                name: name.to_owned(),
                value: Some(value.to_owned()),
            },
            None => Self {
                name: raw_param.to_owned(),
                value: None,
            },
        }
    }

    /// Names are compared once percent-decoded, so `%70ort` is `port`.
    fn has_name(&self, name: &str) -> bool {
        self.decoded_name() == name
    }

    fn decoded_name(&self) -> Cow<'_, str> {
        percent_decode_str(&self.name).decode_utf8_lossy()
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
