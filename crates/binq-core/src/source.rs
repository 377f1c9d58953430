//! Install source strings: a direct URL or `name[@version]`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static NAME_AT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\-\./]+)@([\w\-\.]+)$").expect("name@version pattern is valid")
});

/// What `binq install` was asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A direct `http(s)://` download.
    Url(String),
    /// An item looked up on the index server.
    Named {
        /// Item name, possibly a path such as `owner/tool`.
        name: String,
        /// Requested version; `None` means latest.
        version: Option<String>,
    },
}

impl SourceSpec {
    /// Parses a source argument.
    ///
    /// `name@latest` is the same as `name`. Strings that do not look like
    /// `name@version` are taken as a bare name.
    pub fn parse(src: &str) -> Self {
        if src.starts_with("http://") || src.starts_with("https://") {
            return Self::Url(src.to_string());
        }

        let (name, version) = match NAME_AT_VERSION.captures(src) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (src.to_string(), None),
        };
        Self::Named {
            name,
            version: version.filter(|v| v != "latest"),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Named {
                name,
                version: Some(v),
            } => write!(f, "{name}@{v}"),
            Self::Named {
                name,
                version: None,
            } => f.write_str(name),
        }
    }
}
