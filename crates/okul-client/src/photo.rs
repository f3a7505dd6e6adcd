//! Photo URL resolution
//!
//! Demo accounts carry photo names like `ogrenci_42.jpg`. Those are mapped to
//! a public placeholder-avatar service; every other name is served from the
//! upload host.

use crate::http::ApiClientConfig;

const DEMO_PREFIXES: [(&str, &str); 3] =
    [("ogrenci_", "children"), ("ogretmen_", "women"), ("admin_", "men")];

/// Maps stored photo file names to fetchable URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoResolver {
    upload_url: String,
    placeholder_url: String,
}

impl PhotoResolver {
    /// Create a resolver from explicit hosts
    pub fn new(upload_url: impl Into<String>, placeholder_url: impl Into<String>) -> Self {
        Self { upload_url: upload_url.into(), placeholder_url: placeholder_url.into() }
    }

    /// Create a resolver from client configuration
    pub fn from_config(config: &ApiClientConfig) -> Self {
        Self::new(config.upload_url.clone(), config.placeholder_url.clone())
    }

    /// Resolve a photo file name; empty names have no URL
    pub fn resolve(&self, name: Option<&str>) -> Option<String> {
        let name = name?.trim();
        if name.is_empty() {
            return None;
        }

        for (prefix, category) in DEMO_PREFIXES {
            if name.contains(prefix) {
                return Some(format!(
                    "{}/{}/{}.jpg",
                    self.placeholder_url.trim_end_matches('/'),
                    category,
                    demo_index(name)
                ));
            }
        }

        Some(format!(
            "{}/{}",
            self.upload_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        ))
    }
}

impl Default for PhotoResolver {
    fn default() -> Self {
        Self::from_config(&ApiClientConfig::default())
    }
}

/// All digits in the name read as one number, folded into 0..100
fn demo_index(name: &str) -> u64 {
    name.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| (acc * 10 + u64::from(d)) % 100)
}
