use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// List metadata returned alongside every page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Opaque token for fetching the next page, absent on the last page
    #[serde(default, rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
    /// Estimate of matching items not included in this page
    #[serde(default)]
    pub remaining_item_count: u64,
}

/// Pagination envelope: the page actually transferred plus list metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListPage<T> {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<T>,
}

// Empty listings may encode `items` as null.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            metadata: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>, remaining_item_count: u64) -> Self {
        Self {
            metadata: ListMeta {
                continue_token: None,
                remaining_item_count,
            },
            items,
        }
    }

    /// True total for the query: transferred items plus the remaining estimate
    pub fn total(&self) -> u64 {
        self.items.len() as u64 + self.metadata.remaining_item_count
    }

    pub fn continue_token(&self) -> Option<&str> {
        self.metadata
            .continue_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// A listing whose item bodies are irrelevant; only the count is kept
pub type CountOnlyPage = ListPage<IgnoredAny>;

/// Paging options sent with a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub continue_token: Option<String>,
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn continuing(token: impl Into<String>) -> Self {
        Self {
            continue_token: Some(token.into()),
            limit: None,
        }
    }
}

/// Response of the substrate running-jobs counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstrateJobCount {
    pub count: u64,
}
