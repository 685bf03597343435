use bytes::Bytes;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::input_file::Upload;
use crate::params::Params;

/// Issues Bot API calls and unwraps the response envelope.
#[derive(Debug, Clone)]
pub struct Sender {
    config: BotConfig,
    client: Client,
}

#[derive(Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    migrate_to_chat_id: Option<i64>,
    #[serde(default)]
    retry_after: Option<i64>,
}

impl Sender {
    pub fn new(config: BotConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|err| Error::Config(format!("invalid proxy url: {err}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Calls `method` and decodes its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Params,
        upload: Option<Upload>,
    ) -> Result<T> {
        let result = self.request(method, params, upload).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Posts `params` to `method`: form-encoded, or multipart when a file
    /// is attached. Returns the raw `result` of the envelope.
    pub async fn request(
        &self,
        method: &str,
        params: Params,
        upload: Option<Upload>,
    ) -> Result<Value> {
        debug!(
            "sender: {method} for bot {} (upload: {})",
            self.config.masked_token(),
            upload.is_some()
        );
        let request = self.client.post(self.config.method_url(method));
        let request = match upload {
            None => request.form(&params),
            Some(upload) => request.multipart(multipart_form(params, upload)),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match check_result(status, &body) {
            Ok(result) => {
                debug!("sender: {method} succeeded");
                Ok(result)
            }
            Err(err) => {
                warn!("sender: {method} failed: {err}");
                Err(err)
            }
        }
    }

    /// Fetches the content of a file returned by `getFile`.
    pub async fn download(&self, file_path: &str) -> Result<Bytes> {
        debug!("sender: downloading {file_path}");
        let response = self.client.get(self.config.file_url(file_path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }
        Ok(response.bytes().await?)
    }
}

/// File part first, then every parameter as a text field.
fn multipart_form(params: Params, upload: Upload) -> Form {
    let part = Part::bytes(upload.data).file_name(upload.file_name);
    params
        .iter()
        .fold(Form::new().part(upload.field, part), |form, (key, value)| {
            form.text(key.to_string(), value.to_string())
        })
}

/// Unwraps the `{"ok": ..., "result": ...}` envelope of a response.
pub fn check_result(status: StatusCode, body: &str) -> Result<Value> {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) if envelope.ok => Ok(envelope.result),
        Ok(envelope) => {
            let parameters = envelope.parameters;
            Err(Error::Api {
                error_code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
                retry_after: parameters.as_ref().and_then(|p| p.retry_after),
                migrate_to_chat_id: parameters.as_ref().and_then(|p| p.migrate_to_chat_id),
            })
        }
        Err(_) if !status.is_success() => Err(Error::Status {
            status,
            body: body.to_string(),
        }),
        Err(_) => Err(Error::InvalidJson {
            status,
            body: body.to_string(),
        }),
    }
}
