use serde::Deserialize;

/// List endpoints answer with a bare array, or with a paginated envelope
/// when pagination is enabled on the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        results: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Paginated { results, .. } => results,
        }
    }
}
