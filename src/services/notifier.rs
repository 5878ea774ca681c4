// src/services/notifier.rs

//! Ordered message delivery to notification channels.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{DeliveryConfig, Destination, Secrets};
use crate::utils::text::trim_part;

/// Sends one text message to one destination.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, destination: &Destination, text: &str) -> Result<()>;
}

/// Telegram Bot API messenger.
#[derive(Clone)]
pub struct TelegramMessenger {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramMessenger {
    pub fn new(config: &DeliveryConfig, secrets: &Secrets) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::config(format!("cannot build HTTP client: {e}")))?;
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            secrets.bot_token()
        );
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, destination: &Destination, text: &str) -> Result<()> {
        // The endpoint embeds the bot token; keep it out of error messages.
        let fail = |message: String| AppError::delivery(destination.as_str(), 0, message);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id: destination.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| fail(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| fail(e.without_url().to_string()))?;
        let body: ApiResponse = serde_json::from_str(&raw)
            .map_err(|_| fail(format!("unexpected response (HTTP {status})")))?;

        if body.ok {
            Ok(())
        } else {
            Err(fail(
                body.description
                    .unwrap_or_else(|| format!("rejected (HTTP {status})")),
            ))
        }
    }
}

/// Delivers the parts of one alert, in order, to a destination.
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Send each part as its own message and return how many were sent.
    ///
    /// Parts are trimmed first; parts left empty are not sent. A failure on
    /// part `k` leaves parts before it delivered.
    pub async fn deliver(&self, destination: &Destination, parts: &[String]) -> Result<usize> {
        let mut sent = 0;
        for (index, part) in parts.iter().enumerate() {
            let number = index + 1;
            let text = trim_part(part);
            if text.is_empty() {
                log::debug!("Skipping blank part {number}/{}", parts.len());
                continue;
            }

            self.messenger
                .send(destination, text)
                .await
                .map_err(|e| match e {
                    AppError::Delivery {
                        destination,
                        message,
                        ..
                    } => AppError::Delivery {
                        destination,
                        part: number,
                        message,
                    },
                    other => AppError::delivery(destination.as_str(), number, other),
                })?;

            log::debug!("Sent part {number}/{} to {destination}", parts.len());
            sent += 1;
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(String, String)>>,
        fail_on_call: Option<usize>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(&self, destination: &Destination, text: &str) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_on_call == Some(sent.len() + 1) {
                return Err(AppError::delivery(destination.as_str(), 0, "Bad Request"));
            }
            sent.push((destination.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_api_response_shapes() {
        let ok: ApiResponse =
            serde_json::from_str(r#"{"ok":true,"result":{"message_id":1}}"#).unwrap();
        assert!(ok.ok);

        let rejected: ApiResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!rejected.ok);
        assert_eq!(
            rejected.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[test]
    fn test_endpoint_embeds_token() {
        let config = DeliveryConfig {
            api_base: "https://api.telegram.org/".to_string(),
            ..DeliveryConfig::default()
        };
        let secrets = Secrets::new("123:abc").unwrap();
        let messenger = TelegramMessenger::new(&config, &secrets).unwrap();
        assert_eq!(
            messenger.endpoint,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_parts_sent_in_order_and_trimmed() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone());
        let dest = Destination::new("-100");

        let sent = notifier
            .deliver(&dest, &parts(&["\nfirst\r\n", "second", " third "]))
            .await
            .unwrap();

        assert_eq!(sent, 3);
        let log = messenger.sent.lock().unwrap();
        let texts: Vec<_> = log.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(log.iter().all(|(d, _)| d == "-100"));
    }

    #[tokio::test]
    async fn test_blank_parts_are_skipped() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone());
        let dest = Destination::new("-100");

        let sent = notifier
            .deliver(&dest, &parts(&["a", "\n\r\n", "b"]))
            .await
            .unwrap();

        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_parts_and_reports_part_number() {
        let messenger = Arc::new(RecordingMessenger {
            fail_on_call: Some(2),
            ..Default::default()
        });
        let notifier = Notifier::new(messenger.clone());
        let dest = Destination::new("-100");

        let err = notifier
            .deliver(&dest, &parts(&["one", "two", "three"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Delivery);
        assert!(matches!(err, AppError::Delivery { part: 2, .. }));
        assert_eq!(messenger.sent.lock().unwrap().len(), 1);
    }
}
