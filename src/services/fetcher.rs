// src/services/fetcher.rs

//! Page fetch collaborator.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;
use crate::utils::http::create_client;

/// Retrieves the raw HTML of a page.
///
/// Implementations must bound each call with a timeout and identify
/// themselves with the configured user agent.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// `reqwest`-backed fetcher used in production.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;
        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::error::ErrorKind;

    fn fetcher_config(user_agent: &str, timeout_secs: u64) -> FetcherConfig {
        FetcherConfig {
            user_agent: user_agent.to_string(),
            user_agent_file: None,
            timeout_secs,
        }
    }

    /// Serve one connection, answering with `reply` unless it is `None`,
    /// and hand back the raw request head.
    async fn serve_once(
        reply: Option<&'static str>,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/category/alert/", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            match reply {
                Some(reply) => socket.write_all(reply.as_bytes()).await.unwrap(),
                None => tokio::time::sleep(std::time::Duration::from_secs(10)).await,
            }
            String::from_utf8_lossy(&head).into_owned()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_sends_configured_user_agent() {
        let (url, server) = serve_once(Some(
            "HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
        ))
        .await;
        let fetcher = HttpFetcher::new(&fetcher_config("AlertRelayTest/9.9", 5)).unwrap();

        let body = fetcher.fetch_text(&url).await.unwrap();
        let head = server.await.unwrap().to_ascii_lowercase();

        assert_eq!(body, "hello");
        assert!(head.contains("user-agent: alertrelaytest/9.9\r\n"));
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let (url, _server) = serve_once(Some(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        ))
        .await;
        let fetcher = HttpFetcher::new(&fetcher_config("AlertRelayTest/9.9", 5)).unwrap();

        let err = fetcher.fetch_text(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn test_silent_server_hits_timeout() {
        let (url, _server) = serve_once(None).await;
        let fetcher = HttpFetcher::new(&fetcher_config("AlertRelayTest/9.9", 1)).unwrap();

        let started = std::time::Instant::now();
        let err = fetcher.fetch_text(&url).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
