use std::collections::HashMap;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::domain::repository::PhotoStorage;
use crate::domain::types::PhotoObject;
use crate::error::GalleryServiceError;

const LIST_PAGE_SIZE: usize = 1000;

/// Placeholder object storage keeps in otherwise-empty folders.
const EMPTY_FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

/// Client for the object-storage REST API (`/storage/v1`).
#[derive(Clone)]
pub struct HttpPhotoStorage {
    pub http: reqwest::Client,
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Serialize)]
struct ListBody<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    /// `null` for folders.
    id: Option<String>,
}

#[derive(Serialize)]
struct SignBody<'a> {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
    paths: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SignEntry {
    path: Option<String>,
    #[serde(rename = "signedURL")]
    signed_url: Option<String>,
    error: Option<String>,
}

impl HttpPhotoStorage {
    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/storage/v1/object/{action}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket
        )
    }

    fn absolute(&self, signed_url: &str) -> String {
        if signed_url.starts_with("http://") || signed_url.starts_with("https://") {
            return signed_url.to_owned();
        }
        format!(
            "{}/storage/v1/{}",
            self.base_url.trim_end_matches('/'),
            signed_url.trim_start_matches('/')
        )
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("storage request to {url}"))?
            .error_for_status()
            .with_context(|| format!("storage rejected request to {url}"))?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decode storage response from {url}"))
    }
}

fn photo_objects(prefix: &str, entries: Vec<ListEntry>) -> Vec<PhotoObject> {
    entries
        .into_iter()
        .filter(|e| e.id.is_some() && e.name != EMPTY_FOLDER_PLACEHOLDER)
        .map(|e| PhotoObject {
            path: format!("{prefix}{}", e.name),
            name: e.name,
        })
        .collect()
}

/// Pair sign results back to `paths` by object path, preserving input order.
fn order_signed(
    paths: &[String],
    entries: Vec<SignEntry>,
    absolute: impl Fn(&str) -> String,
) -> anyhow::Result<Vec<String>> {
    let mut by_path: HashMap<String, String> = HashMap::with_capacity(entries.len());
    for entry in entries {
        match (entry.path, entry.signed_url, entry.error) {
            (Some(path), Some(url), None) => {
                by_path.insert(path, absolute(&url));
            }
            (path, _, error) => anyhow::bail!(
                "storage could not sign {}: {}",
                path.as_deref().unwrap_or("<unknown>"),
                error.as_deref().unwrap_or("missing signed url")
            ),
        }
    }
    paths
        .iter()
        .map(|p| {
            by_path
                .remove(p)
                .with_context(|| format!("storage returned no signed url for {p}"))
        })
        .collect()
}

impl PhotoStorage for HttpPhotoStorage {
    async fn list(&self, prefix: &str) -> Result<Vec<PhotoObject>, GalleryServiceError> {
        let folder = prefix.trim_end_matches('/');
        let mut objects = Vec::new();
        let mut offset = 0;
        loop {
            let page: Vec<ListEntry> = self
                .post_json(
                    self.endpoint("list"),
                    &ListBody {
                        prefix: folder,
                        limit: LIST_PAGE_SIZE,
                        offset,
                        sort_by: SortBy {
                            column: "name",
                            order: "asc",
                        },
                    },
                )
                .await?;
            let fetched = page.len();
            objects.extend(photo_objects(prefix, page));
            if fetched < LIST_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        Ok(objects)
    }

    async fn sign_urls(
        &self,
        paths: &[String],
        expires_in_secs: u64,
    ) -> Result<Vec<String>, GalleryServiceError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<SignEntry> = self
            .post_json(
                self.endpoint("sign"),
                &SignBody {
                    expires_in: expires_in_secs,
                    paths,
                },
            )
            .await?;
        Ok(order_signed(paths, entries, |u| self.absolute(u))?)
    }
}
