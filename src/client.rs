use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::classification::ClassificationResult;
use crate::config::Config;
use crate::error::SubmitError;
use crate::selection::InputFile;

/// Multipart field the backend reads the sample from
pub const FILE_FIELD: &str = "file";

/// Remote classifier boundary. One call is one request; no retries.
#[async_trait]
pub trait ClassificationService: Send + Sync + 'static {
    async fn classify(&self, file: InputFile) -> Result<ClassificationResult, SubmitError>;
}

/// Production classifier speaking the `POST <endpoint><path>` multipart contract
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http: reqwest::Client,
    url: Url,
}

impl HttpClassifier {
    pub fn new(endpoint: &str, path: &str, timeout: Option<Duration>) -> Result<Self, SubmitError> {
        let url = predict_url(endpoint, path)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SubmitError> {
        Self::new(
            &config.endpoint,
            &config.predict_path,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ClassificationService for HttpClassifier {
    async fn classify(&self, file: InputFile) -> Result<ClassificationResult, SubmitError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.media_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.http.post(self.url.clone()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status));
        }

        let body = response.bytes().await?;
        let result = ClassificationResult::from_json(&body)?;
        tracing::debug!(url = %self.url, points = result.series.len(), "decoded prediction");
        Ok(result)
    }
}

/// Join a base address and a path without caring about slashes on either side
pub fn predict_url(endpoint: &str, path: &str) -> Result<Url, SubmitError> {
    let joined = format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|err| SubmitError::InvalidEndpoint {
        endpoint: joined.clone(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn predict_url_joins_slashes() {
        for (endpoint, path) in [
            ("http://127.0.0.1:8000", "/predict"),
            ("http://127.0.0.1:8000/", "predict"),
            ("http://127.0.0.1:8000/", "/predict"),
        ] {
            assert_eq!(
                predict_url(endpoint, path).unwrap().as_str(),
                "http://127.0.0.1:8000/predict"
            );
        }
    }

    #[test]
    fn predict_url_keeps_base_path() {
        let url = predict_url("https://exo.example.org/api/v1", "/predict").unwrap();
        assert_eq!(url.as_str(), "https://exo.example.org/api/v1/predict");
    }

    #[test]
    fn predict_url_rejects_garbage() {
        assert_matches!(
            predict_url("not a url", "/predict"),
            Err(SubmitError::InvalidEndpoint { .. })
        );
    }

    #[test]
    fn from_config_uses_configured_address() {
        let config = Config {
            endpoint: "http://10.0.0.5:9000".into(),
            predict_path: "/classify".into(),
            ..Config::default()
        };
        let classifier = HttpClassifier::from_config(&config).unwrap();
        assert_eq!(classifier.url().as_str(), "http://10.0.0.5:9000/classify");
    }
}
