//! HTTP photo source.
//!
//! Talks to the photo-listing endpoint:
//!
//! ```text
//! GET {base_url}/api/photos?date=YYYY-MM-DD
//! -> { "new_date": "...", "photos": [ ... ] }
//! ```
//!
//! No timeout is configured on the client: a request runs until the server
//! answers or the connection fails.

use async_trait::async_trait;
use reqwest::Client;

use super::{Cursor, Page, PhotoSource};
use crate::error::FetchFailure;

const PHOTOS_PATH: &str = "/api/photos";

/// Photo source backed by the remote API.
#[derive(Clone)]
pub struct ApiSource {
    client: Client,
    base_url: String,
}

impl ApiSource {
    /// Create a source for the API hosted at `base_url`
    /// (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str) -> Result<Self, FetchFailure> {
        let client = Client::builder()
            .user_agent(concat!("spacefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, PHOTOS_PATH)
    }
}

#[async_trait]
impl PhotoSource for ApiSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page, FetchFailure> {
        tracing::debug!(cursor = %cursor, "requesting page");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("date", cursor.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let page = Page::from_json(&body)?;

        tracing::debug!(
            cursor = %cursor,
            new_date = %page.new_date,
            photos = page.photos.len(),
            "page received"
        );
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response, returning the base URL and a handle
    /// that resolves to the raw request line the client sent.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn fetch_page_sends_cursor_and_parses_body() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"new_date":"2022-04-30","photos":[{"date":"2022-05-01","title":"IC 410","url":"https://example.com/a.jpg"}]}"#,
        )
        .await;

        let source = ApiSource::new(&url).unwrap();
        let page = source.fetch_page(&Cursor::new("2022-05-01")).await.unwrap();

        assert_eq!(page.new_date, Cursor::new("2022-04-30"));
        assert_eq!(page.photos.len(), 1);
        assert_eq!(page.photos[0].date, "2022-05-01");

        let request_line = server.await.unwrap();
        assert_eq!(request_line, "GET /api/photos?date=2022-05-01 HTTP/1.1");
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let (url, _server) = serve_once("500 Internal Server Error", "{}").await;

        let source = ApiSource::new(&url).unwrap();
        let err = source.fetch_page(&Cursor::new("2022-05-01")).await.unwrap_err();

        assert!(matches!(err, FetchFailure::Status(500)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let (url, _server) = serve_once("200 OK", "<html>oops</html>").await;

        let source = ApiSource::new(&url).unwrap();
        let err = source.fetch_page(&Cursor::new("2022-05-01")).await.unwrap_err();

        assert!(matches!(err, FetchFailure::Malformed(_)));
    }

    #[tokio::test]
    async fn body_without_photos_is_a_failure() {
        let (url, _server) = serve_once("200 OK", r#"{"new_date":"2022-04-30"}"#).await;

        let source = ApiSource::new(&url).unwrap();
        let err = source.fetch_page(&Cursor::new("2022-05-01")).await.unwrap_err();

        assert!(matches!(err, FetchFailure::Malformed(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_failure() {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = ApiSource::new(&format!("http://{addr}")).unwrap();
        let err = source.fetch_page(&Cursor::new("2022-05-01")).await.unwrap_err();

        assert!(matches!(err, FetchFailure::Transport(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let source = ApiSource::new("http://localhost:3000/").unwrap();
        assert_eq!(source.base_url(), "http://localhost:3000");
        assert_eq!(source.endpoint(), "http://localhost:3000/api/photos");
        assert_eq!(source.name(), "http://localhost:3000");
    }
}
