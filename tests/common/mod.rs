#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use truck_card_relay::config::RelayConfig;
use truck_card_relay::services::form::UploadedFile;
use truck_card_relay::services::telegram::{
    Messenger, ParseMode, TelegramCredentials, TelegramError,
};
use truck_card_relay::{AppState, UPLOAD_ROUTE, create_app};

pub const BOUNDARY: &str = "---------------------------relay4815162342";
pub const BOT_TOKEN: &str = "123456:TEST_TOKEN";
pub const CHAT_ID: &str = "-1001234567890";

#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text {
        chat_id: String,
        text: String,
        parse_mode: ParseMode,
    },
    Photo {
        chat_id: String,
        field_name: String,
        data: Vec<u8>,
        caption: String,
    },
}

/// Records every send; optionally fails the N-th call (0-based)
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    fail_on_call: Option<usize>,
    calls: Mutex<usize>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on_call: None,
            calls: Mutex::new(0),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn next_call(&self) -> Result<(), TelegramError> {
        let mut calls = self.calls.lock().unwrap();
        let current = *calls;
        *calls += 1;
        if self.fail_on_call == Some(current) {
            return Err(TelegramError::Api {
                status: 400,
                description: "Bad Request: simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        credentials: &TelegramCredentials,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), TelegramError> {
        self.next_call()?;
        self.sent.lock().unwrap().push(SentMessage::Text {
            chat_id: credentials.chat_id.clone(),
            text: text.to_string(),
            parse_mode,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        credentials: &TelegramCredentials,
        photo: &UploadedFile,
        caption: &str,
    ) -> Result<(), TelegramError> {
        self.next_call()?;
        self.sent.lock().unwrap().push(SentMessage::Photo {
            chat_id: credentials.chat_id.clone(),
            field_name: photo.field_name.clone(),
            data: photo.data.to_vec(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

pub fn configured() -> RelayConfig {
    RelayConfig::with_telegram(BOT_TOKEN, CHAT_ID)
}

pub fn app_with(config: RelayConfig, messenger: Arc<RecordingMessenger>) -> Router {
    let messenger: Arc<dyn Messenger> = messenger;
    create_app(AppState { config, messenger })
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                );
            }
            Part::File(name, file_name, content) => {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/jpeg\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(UPLOAD_ROUTE)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn full_upload<'a>(truck_id: &'a str, truck_name: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("truckId", truck_id),
        Part::Text("truckName", truck_name),
        Part::File("cardFront", "front.jpg", b"front-image-bytes"),
        Part::File("cardBack", "back.jpg", b"back-image-bytes"),
    ]
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value, HeaderMap) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json, headers)
}
