use futures_util::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde_json::Value;
use service_handle::{InvokeError, MethodSignature, ServiceHandle};

use crate::config::HttpServiceConfig;
use crate::error::{parse_error_message, HttpServiceError};
use crate::manifest::ServiceManifest;

#[derive(Debug)]
pub struct HttpService {
    http: Client,
    config: HttpServiceConfig,
    service_name: String,
    qualified_name: String,
    methods: Vec<MethodSignature>,
}

impl HttpService {
    /// Resolves `service` (or the only declared service) from `manifest`.
    pub fn new(
        config: HttpServiceConfig,
        manifest: &ServiceManifest,
        service: Option<&str>,
    ) -> Result<Self, HttpServiceError> {
        let decl = manifest.select(service)?;

        let http = Client::builder()
            .build()
            .map_err(HttpServiceError::Client)?;

        Ok(Self {
            http,
            service_name: decl.name.clone(),
            qualified_name: manifest.qualified_name(decl),
            methods: decl.signatures(),
            config,
        })
    }

    pub fn config(&self) -> &HttpServiceConfig {
        &self.config
    }

    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url(),
            self.qualified_name,
            method
        )
    }

    pub fn build_request(&self, method: &str, params: &Value) -> reqwest::RequestBuilder {
        self.http.post(self.method_url(method)).json(params)
    }

    async fn call(&self, method: String, params: Value) -> Result<Value, InvokeError> {
        tracing::debug!(url = %self.method_url(&method), "sending request");
        let response = self
            .build_request(&method, &params)
            .send()
            .await
            .map_err(|err| InvokeError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|err| InvokeError::transport(format!("invalid response body: {err}")));
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(status, &body);
        Err(InvokeError::status(format!("HTTP {status}: {message}")))
    }
}

impl ServiceHandle for HttpService {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    fn invoke(&self, method: &str, params: Value) -> BoxFuture<'_, Result<Value, InvokeError>> {
        self.call(method.to_string(), params).boxed()
    }
}
