use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// 快照位置：Firebase REST URL（例如 https://<db>.firebaseio.com/exercises.json）或本機匯出檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Http(Url),
    File(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub parameters: Vec<(String, String)>,
}

impl SnapshotSource {
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location).map_err(|e| EtlError::InvalidConfigValueError {
                field: "source".to_string(),
                value: location.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;
            Ok(SnapshotSource::Http(url))
        } else {
            Ok(SnapshotSource::File(PathBuf::from(location)))
        }
    }

    pub async fn fetch(&self, client: &Client, options: &RequestOptions) -> Result<serde_json::Value> {
        match self {
            SnapshotSource::Http(url) => {
                let mut request = client.get(url.clone());

                // 自訂標頭
                for (key, value) in &options.headers {
                    request = request.header(key, value);
                }

                // 查詢參數，例如 Firebase 的 auth
                if !options.parameters.is_empty() {
                    request = request.query(&options.parameters);
                }

                if let Some(timeout) = options.timeout {
                    request = request.timeout(timeout);
                }

                tracing::debug!("Requesting snapshot from: {}", url);
                let response = request.send().await?;
                tracing::debug!("Snapshot response status: {}", response.status());

                if !response.status().is_success() {
                    return Err(EtlError::HttpStatusError {
                        endpoint: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }

                Ok(response.json().await?)
            }
            SnapshotSource::File(path) => {
                tracing::debug!("Reading snapshot from file: {}", path.display());
                let bytes = tokio::fs::read(path).await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_locations() {
        assert!(matches!(
            SnapshotSource::parse("https://demo.firebaseio.com/exercises.json").unwrap(),
            SnapshotSource::Http(_)
        ));
        assert_eq!(
            SnapshotSource::parse("./data/exercises.json").unwrap(),
            SnapshotSource::File(PathBuf::from("./data/exercises.json"))
        );
        assert!(SnapshotSource::parse("http://").is_err());
    }

    #[tokio::test]
    async fn test_fetch_http_with_auth_parameter() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/exercises.json")
                .query_param("auth", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"-a": {"userID": "p1"}}));
        });

        let source = SnapshotSource::parse(&server.url("/exercises.json")).unwrap();
        let options = RequestOptions {
            parameters: vec![("auth".to_string(), "secret".to_string())],
            ..Default::default()
        };

        let value = source.fetch(&Client::new(), &options).await.unwrap();

        api_mock.assert();
        assert_eq!(value["-a"]["userID"], "p1");
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/prescriptions.json");
            then.status(401);
        });

        let source = SnapshotSource::parse(&server.url("/prescriptions.json")).unwrap();
        let err = source
            .fetch(&Client::new(), &RequestOptions::default())
            .await
            .unwrap_err();

        api_mock.assert();
        assert!(matches!(err, EtlError::HttpStatusError { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"userID": "p1"}]"#).unwrap();

        let source = SnapshotSource::File(file.path().to_path_buf());
        let value = source
            .fetch(&Client::new(), &RequestOptions::default())
            .await
            .unwrap();
        assert!(value.is_array());
    }
}
