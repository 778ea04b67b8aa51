use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::error::{Result, VaultError};
use crate::models::{
    ComplexResult, ErrorBody, FileContents, FileList, Period, QueryType, SearchResult, NOTE_JSON,
};
use crate::utils::{date_path, dql_string, encode_vault_path};

const USER_AGENT: &str = concat!("vault-rest/", env!("CARGO_PKG_VERSION"));

/// Operations the tool layer needs from the vault.
#[async_trait]
pub trait VaultBackend: Send + Sync {
    async fn list_files_in_vault(&self) -> Result<Vec<String>>;

    async fn list_files_in_dir(&self, dir: &str) -> Result<Vec<String>>;

    async fn get_file_contents(&self, path: &str) -> Result<FileContents>;

    /// Resolve a bare note name (no directory, no extension) to every matching file.
    async fn get_file_by_name(&self, name: &str, include_content: bool)
        -> Result<Vec<FileContents>>;

    async fn simple_search(&self, query: &str, context_length: u64) -> Result<Vec<SearchResult>>;

    async fn complex_search(&self, query: &str, query_type: &QueryType)
        -> Result<Vec<ComplexResult>>;

    async fn get_periodic_note(&self, period: Period) -> Result<FileContents>;

    async fn get_periodic_note_by_date(&self, period: Period, date: &str) -> Result<FileContents>;

    async fn get_periodic_note_recent(
        &self,
        period: Period,
        limit: u64,
        include_content: bool,
    ) -> Result<Vec<FileContents>>;
}

/// HTTP client for the vault's REST API.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct VaultClient {
    client: Client,
    base_url: String,
}

impl VaultClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| VaultError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(NOTE_JSON));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(VaultError::Client)?;

        Ok(Self {
            client,
            base_url: config.api_host.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<(&str, &str)>,
    ) -> Result<T> {
        let mut request = self.client.request(method, url);
        if let Some((content_type, body)) = body {
            request = request
                .header(CONTENT_TYPE, content_type)
                .body(body.to_string());
        }

        let response = request.send().await.map_err(|source| {
            error!(path = %url, error = %source, "failed to execute request");
            VaultError::Request {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|source| {
            error!(path = %url, error = %source, "failed to read response body");
            VaultError::Request {
                url: url.to_string(),
                source,
            }
        })?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(ErrorBody {
                    error_code: Some(code),
                    message,
                }) => format!("{} (error code {})", message, code),
                Ok(body) => body.message,
                Err(_) => {
                    let text = String::from_utf8_lossy(&bytes).trim().to_string();
                    if text.is_empty() {
                        status.canonical_reason().unwrap_or("no body").to_string()
                    } else {
                        text
                    }
                }
            };
            error!(path = %url, %status, %message, "request rejected");
            return Err(VaultError::Status {
                url: url.to_string(),
                status,
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| {
            error!(path = %url, error = %source, "failed to decode response");
            VaultError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }

    async fn fetch_note(&self, url: &str) -> Result<FileContents> {
        let note: FileContents = self.call(Method::GET, url, None).await?;
        info!(path = %url, result = %note.summary(), "retrieved note");
        Ok(note)
    }

    async fn fetch_file_list(&self, url: &str) -> Result<Vec<String>> {
        let list: FileList = self.call(Method::GET, url, None).await?;
        info!(path = %url, files = list.files.len(), "listed files");
        Ok(list.files)
    }
}

#[async_trait]
impl VaultBackend for VaultClient {
    async fn list_files_in_vault(&self) -> Result<Vec<String>> {
        let url = self.url("/vault/");
        info!(path = %url, "listing files in vault");
        self.fetch_file_list(&url).await
    }

    async fn list_files_in_dir(&self, dir: &str) -> Result<Vec<String>> {
        let url = self.url(&format!("/vault/{}", encode_vault_path(dir)));
        info!(path = %url, "listing files in directory");
        self.fetch_file_list(&url).await
    }

    async fn get_file_contents(&self, path: &str) -> Result<FileContents> {
        let url = self.url(&format!("/vault/{}", encode_vault_path(path)));
        info!(path = %url, "getting file contents");
        self.fetch_note(&url).await
    }

    async fn get_file_by_name(
        &self,
        name: &str,
        include_content: bool,
    ) -> Result<Vec<FileContents>> {
        let query = format!("TABLE WHERE file.name={}", dql_string(name));
        let hits = self.complex_search(&query, &QueryType::DataviewDql).await?;

        let mut files = Vec::with_capacity(hits.len());
        for hit in hits {
            // The REST API has no way to skip the body, so it is fetched and dropped.
            let mut contents = self.get_file_contents(&hit.filename).await?;
            if !include_content {
                contents.content.clear();
            }
            if contents.path.is_none() {
                contents.path = Some(hit.filename);
            }
            files.push(contents);
        }

        info!(name, matches = files.len(), "resolved file by name");
        Ok(files)
    }

    async fn simple_search(&self, query: &str, context_length: u64) -> Result<Vec<SearchResult>> {
        let url = self.url(&format!(
            "/search/simple/?query={}&contextLength={}",
            urlencoding::encode(query),
            context_length
        ));
        info!(path = %url, "searching in vault");

        match self.call::<Vec<SearchResult>>(Method::POST, &url, None).await {
            Ok(results) => {
                info!(path = %url, results = results.len(), "searched in vault");
                Ok(results)
            }
            Err(e) => {
                error!(path = %url, error = %e, "failed to search in vault");
                Err(e)
            }
        }
    }

    async fn complex_search(
        &self,
        query: &str,
        query_type: &QueryType,
    ) -> Result<Vec<ComplexResult>> {
        let url = self.url("/search/");
        info!(path = %url, content_type = query_type.content_type(), "searching in vault");

        let body = Some((query_type.content_type(), query));
        match self.call::<Vec<ComplexResult>>(Method::POST, &url, body).await {
            Ok(results) => {
                info!(path = %url, results = results.len(), "searched in vault");
                Ok(results)
            }
            Err(e) => {
                error!(path = %url, error = %e, "failed to search in vault");
                Err(e)
            }
        }
    }

    async fn get_periodic_note(&self, period: Period) -> Result<FileContents> {
        let url = self.url(&format!("/periodic/{}", period));
        info!(path = %url, "getting periodic note");
        self.fetch_note(&url).await
    }

    async fn get_periodic_note_by_date(&self, period: Period, date: &str) -> Result<FileContents> {
        let url = self.url(&format!("/periodic/{}/{}", period, date_path(date)));
        info!(path = %url, "getting periodic note by date");
        self.fetch_note(&url).await
    }

    async fn get_periodic_note_recent(
        &self,
        period: Period,
        limit: u64,
        include_content: bool,
    ) -> Result<Vec<FileContents>> {
        let url = self.url(&format!(
            "/periodic/{}/recent?limit={}&includeContent={}",
            period, limit, include_content
        ));
        info!(path = %url, "getting recent periodic notes");

        let notes: Vec<FileContents> = self.call(Method::GET, &url, None).await?;
        info!(path = %url, results = notes.len(), "retrieved recent periodic notes");
        Ok(notes)
    }
}
