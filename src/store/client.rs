use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{Store, StoreError};
use crate::config::StoreConfig;
use crate::records::types::{
    DescriptionOption, IstRow, IstScores, PapikostickRow, PapikostickScores, PersonalInfo,
    PersonalRecord, TestReport, DESCRIPTION_TABLE, IST_TABLE, PAPIKOSTICK_TABLE, PERSONAL_TABLE,
};
use crate::scoring::Band;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Personal record with both embedded one-to-one children.
pub const REPORT_SELECT: &str = "*,ist(*),papikostick(*)";

const DESCRIPTION_SELECT: &str = "description,kompetensi,hasil_evaluasi";

/// Store backed by a PostgREST-style REST endpoint (`/rest/v1/<table>`).
pub struct RestStore {
    client: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    token: String,
}

impl RestStore {
    /// Build a store for the configured endpoint, authenticated with the
    /// session's access token.
    pub fn new(config: &StoreConfig, token: String) -> Result<Self, StoreError> {
        let base = Url::parse(&config.url).map_err(|e| StoreError::InvalidUrl {
            url: config.url.clone(),
            message: e.to_string(),
        })?;

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("psikotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Backend(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
            token,
        })
    }

    fn request(
        &self,
        method: Method,
        table: &'static str,
        params: &[(&str, String)],
    ) -> Result<RequestBuilder, StoreError> {
        let url = table_url(&self.base, table, params)?;
        tracing::debug!(%method, %url, "store request");

        let mut builder = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }
        Ok(builder)
    }

    async fn send(
        &self,
        table: &'static str,
        builder: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|source| StoreError::Http { table, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(table, status, body))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let builder = self.request(Method::GET, table, params)?;
        let response = self.send(table, builder).await?;
        decode(table, response).await
    }

    async fn insert_rows<T: Serialize + Sync>(
        &self,
        table: &'static str,
        row: &T,
    ) -> Result<(), StoreError> {
        let builder = self
            .request(Method::POST, table, &[])?
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send(table, builder).await?;
        Ok(())
    }

    async fn delete_where(
        &self,
        table: &'static str,
        column: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let builder = self.request(Method::DELETE, table, &[(column, eq(value))])?;
        self.send(table, builder).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for RestStore {
    async fn count_personal(&self) -> Result<u64, StoreError> {
        let builder = self
            .request(Method::HEAD, PERSONAL_TABLE, &[("select", "id".to_string())])?
            .header("Prefer", "count=exact");
        let response = self.send(PERSONAL_TABLE, builder).await?;

        let header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        parse_content_range_total(header).ok_or_else(|| StoreError::Decode {
            table: PERSONAL_TABLE,
            message: format!("unexpected Content-Range '{}'", header),
        })
    }

    async fn insert_personal(&self, info: &PersonalInfo) -> Result<PersonalRecord, StoreError> {
        let builder = self
            .request(Method::POST, PERSONAL_TABLE, &[])?
            .header("Prefer", "return=representation")
            .json(&[info]);
        let response = self.send(PERSONAL_TABLE, builder).await?;
        let rows: Vec<PersonalRecord> = decode(PERSONAL_TABLE, response).await?;
        rows.into_iter().next().ok_or(StoreError::EmptyInsert {
            table: PERSONAL_TABLE,
        })
    }

    async fn insert_ist(&self, row: &IstRow) -> Result<(), StoreError> {
        self.insert_rows(IST_TABLE, row).await
    }

    async fn insert_papikostick(&self, row: &PapikostickRow) -> Result<(), StoreError> {
        self.insert_rows(PAPIKOSTICK_TABLE, row).await
    }

    async fn fetch_report(&self, id: &str) -> Result<Option<TestReport>, StoreError> {
        let rows: Vec<TestReport> = self
            .get_rows(
                PERSONAL_TABLE,
                &[("select", REPORT_SELECT.to_string()), ("id", eq(id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_ist_for(&self, personal_id: &str) -> Result<Option<IstScores>, StoreError> {
        let rows: Vec<IstScores> = self
            .get_rows(
                IST_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("personal_info_id", eq(personal_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_papikostick_for(
        &self,
        personal_id: &str,
    ) -> Result<Option<PapikostickScores>, StoreError> {
        let rows: Vec<PapikostickScores> = self
            .get_rows(
                PAPIKOSTICK_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("personal_info_id", eq(personal_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_personal(&self, limit: Option<usize>) -> Result<Vec<PersonalRecord>, StoreError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(n) = limit {
            params.push(("limit", n.to_string()));
        }
        self.get_rows(PERSONAL_TABLE, &params).await
    }

    async fn list_reports(&self) -> Result<Vec<TestReport>, StoreError> {
        self.get_rows(
            PERSONAL_TABLE,
            &[
                ("select", REPORT_SELECT.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn delete_ist_for(&self, personal_id: &str) -> Result<(), StoreError> {
        self.delete_where(IST_TABLE, "personal_info_id", personal_id)
            .await
    }

    async fn delete_papikostick_for(&self, personal_id: &str) -> Result<(), StoreError> {
        self.delete_where(PAPIKOSTICK_TABLE, "personal_info_id", personal_id)
            .await
    }

    async fn delete_personal(&self, id: &str) -> Result<(), StoreError> {
        self.delete_where(PERSONAL_TABLE, "id", id).await
    }

    async fn descriptions_in(&self, band: Band) -> Result<Vec<DescriptionOption>, StoreError> {
        self.get_rows(
            DESCRIPTION_TABLE,
            &[
                ("select", DESCRIPTION_SELECT.to_string()),
                ("category", eq(band.code())),
            ],
        )
        .await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn table_url(base: &Url, table: &str, params: &[(&str, String)]) -> Result<Url, StoreError> {
    let raw = format!("{}/rest/v1/{}", base.as_str().trim_end_matches('/'), table);
    let pairs = params.iter().map(|(k, v)| (*k, v.as_str()));
    Url::parse_with_params(&raw, pairs).map_err(|e| StoreError::InvalidUrl {
        url: raw.clone(),
        message: e.to_string(),
    })
}

async fn decode<T: DeserializeOwned>(
    table: &'static str,
    response: Response,
) -> Result<T, StoreError> {
    let body = response
        .bytes()
        .await
        .map_err(|source| StoreError::Http { table, source })?;
    serde_json::from_slice(&body).map_err(|e| StoreError::Decode {
        table,
        message: e.to_string(),
    })
}

fn status_error(table: &'static str, status: StatusCode, body: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized {
            status: status.as_u16(),
        },
        _ => StoreError::Status {
            table,
            status: status.as_u16(),
            message: error_message(&body),
        },
    }
}

/// Prefer the backend's `message` field over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[test]
    fn test_table_url_with_filters() {
        let base = Url::parse("https://db.example.com/").unwrap();
        let url = table_url(
            &base,
            PERSONAL_TABLE,
            &[("select", REPORT_SELECT.to_string()), ("id", eq("abc"))],
        )
        .unwrap();
        assert_eq!(url.path(), "/rest/v1/personal_info");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), "*,ist(*),papikostick(*)".to_string()),
                ("id".to_string(), "eq.abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(IST_TABLE, StatusCode::UNAUTHORIZED, String::new()),
            StoreError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            status_error(IST_TABLE, StatusCode::FORBIDDEN, String::new()),
            StoreError::Unauthorized { status: 403 }
        ));

        let err = status_error(
            IST_TABLE,
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value"}"#.to_string(),
        );
        assert_eq!(err.to_string(), "ist returned HTTP 409: duplicate key value");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = StoreConfig {
            url: "not a url".to_string(),
            api_key: None,
            timeout_secs: None,
        };
        assert!(matches!(
            RestStore::new(&config, "t".to_string()),
            Err(StoreError::InvalidUrl { .. })
        ));
    }
}
