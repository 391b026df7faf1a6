//! HttpSocialApi -- concrete [`SocialApi`] implementation over HTTP.
//!
//! Every call is a JSON POST to `{host}/api/<endpoint>` carrying the access
//! token in the `i` field. File upload is a multipart POST to
//! `drive/files/create`.
//!
//! The token is kept in a [`SecretString`] and only exposed while building
//! a request body.

use std::time::Duration;

use chirpbot_core::api::SocialApi;
use chirpbot_types::error::ApiError;
use chirpbot_types::note::{DriveFile, NewNote, Note, User};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Social API client. Does not derive Debug so the token cannot leak.
pub struct HttpSocialApi {
    client: reqwest::Client,
    host: String,
    token: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedNote {
    created_note: Note,
}

impl HttpSocialApi {
    /// Create a client for `host` (e.g. `https://example.social`).
    pub fn new(host: impl Into<String>, token: SecretString) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.host, endpoint)
    }

    /// `params` with the access token added.
    fn body(&self, mut params: Value) -> Value {
        if let Value::Object(map) = &mut params {
            map.insert("i".into(), Value::String(self.token.expose_secret().to_string()));
        }
        params
    }

    async fn post(&self, endpoint: &str, params: Value) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&self.body(params))
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("{endpoint}: {e}")))?;

        check_status(endpoint, response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, endpoint: &str, params: Value) -> Result<T, ApiError> {
        self.post(endpoint, params)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }
}

async fn check_status(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%endpoint, status = status.as_u16(), "api call rejected");
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn message_params(user_id: &str, text: Option<&str>, file_id: Option<&str>) -> Value {
    let mut params = json!({ "userId": user_id });
    if let Some(text) = text {
        params["text"] = json!(text);
    }
    if let Some(file_id) = file_id {
        params["fileId"] = json!(file_id);
    }
    params
}

impl SocialApi for HttpSocialApi {
    async fn fetch_self(&self) -> Result<User, ApiError> {
        self.post_json("i", json!({})).await
    }

    async fn show_note(&self, note_id: &str) -> Result<Note, ApiError> {
        self.post_json("notes/show", json!({ "noteId": note_id })).await
    }

    async fn create_reaction(&self, note_id: &str, reaction: &str) -> Result<(), ApiError> {
        self.post(
            "notes/reactions/create",
            json!({ "noteId": note_id, "reaction": reaction }),
        )
        .await
        .map(|_| ())
    }

    async fn read_message(&self, message_id: &str) -> Result<(), ApiError> {
        self.post("messaging/messages/read", json!({ "messageId": message_id }))
            .await
            .map(|_| ())
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        let params = serde_json::to_value(note)
            .map_err(|e| ApiError::Decode(format!("notes/create: {e}")))?;
        let created: CreatedNote = self.post_json("notes/create", params).await?;
        Ok(created.created_note)
    }

    async fn send_message(
        &self,
        user_id: &str,
        text: Option<&str>,
        file_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.post("messaging/messages/create", message_params(user_id, text, file_id))
            .await
            .map(|_| ())
    }

    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<DriveFile, ApiError> {
        const ENDPOINT: &str = "drive/files/create";

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ApiError::Http(format!("{ENDPOINT}: invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("i", self.token.expose_secret().to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.url(ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("{ENDPOINT}: {e}")))?;

        check_status(ENDPOINT, response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{ENDPOINT}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> HttpSocialApi {
        HttpSocialApi::new("https://example.social/", SecretString::from("test-token")).unwrap()
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = make_client();
        assert_eq!(client.host(), "https://example.social");
        assert_eq!(client.url("notes/show"), "https://example.social/api/notes/show");
    }

    #[test]
    fn test_body_carries_token() {
        let client = make_client();
        let body = client.body(json!({ "noteId": "n1" }));
        assert_eq!(body, json!({ "noteId": "n1", "i": "test-token" }));
    }

    #[test]
    fn test_message_params_skip_missing() {
        assert_eq!(message_params("u1", Some("hi"), None), json!({ "userId": "u1", "text": "hi" }));
        assert_eq!(message_params("u1", None, Some("f1")), json!({ "userId": "u1", "fileId": "f1" }));
    }

    #[test]
    fn test_created_note_decodes() {
        let created: CreatedNote = serde_json::from_value(json!({
            "createdNote": {
                "id": "n9",
                "userId": "agent",
                "user": { "id": "agent", "username": "agent" },
                "text": "hello",
                "replyId": "n1"
            }
        }))
        .unwrap();
        assert_eq!(created.created_note.id, "n9");
        assert_eq!(created.created_note.reply_id.as_deref(), Some("n1"));
    }
}
