//! Page fetching and text extraction.
//!
//! A single HTTP GET per call, no retries. The HTML is reduced to its
//! visible text: `script` and `style` subtrees are dropped, block-level
//! elements become line breaks, and whitespace is normalized line by line.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::core::{CampaignError, CampaignResult, FetchConfig};

/// Elements whose text never reaches the output.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Elements that start and end a line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "title", "tr", "ul",
];

/// Source of page text for the workflow.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its plain text.
    ///
    /// Never returns an empty string: a page without text is a fetch error.
    async fn fetch_text(&self, url: &str) -> CampaignResult<String>;
}

/// HTTP page fetcher.
pub struct WebFetcher {
    client: reqwest::Client,
}

impl WebFetcher {
    /// Create a fetcher with the configured timeout and user agent.
    pub fn new(config: &FetchConfig) -> CampaignResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CampaignError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        response.text().await.map_err(|e| format!("failed to read response body: {e}"))
    }
}

#[async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch_text(&self, url: &str) -> CampaignResult<String> {
        let url = normalize_url(url);
        debug!(url = %url, "Fetching page");

        let html = match self.fetch_html(&url).await {
            Ok(html) => html,
            Err(reason) => {
                warn!(url = %url, error = %reason, "Error scraping URL");
                return Err(CampaignError::Fetch { url, reason });
            }
        };

        let text = extract_text(&html);
        if text.is_empty() {
            warn!(url = %url, "No text content found");
            return Err(CampaignError::Fetch { url, reason: "no text content found".to_string() });
        }

        info!(url = %url, chars = text.chars().count(), "Scraped page content");
        Ok(text)
    }
}

/// Prepend `https://` when the URL has no http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Reduce an HTML document to normalized visible text.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }

            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// Trim every line, split on double-space runs, drop empty fragments and
/// rejoin with newlines.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    const PAGE: &str = r#"
    <html>
        <head><title>Test</title></head>
        <body>
            <script>console.log('ignore')</script>
            <style>.ignore { color: red; }</style>
            <header><h1>Title</h1></header>
            <main><p>This is the main content.</p><p>Another paragraph.</p></main>
            <footer>Footer content</footer>
        </body>
    </html>
    "#;

    /// Serve a single HTTP response on a random local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "{status_line}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{addr}/")
    }

    fn fetcher() -> WebFetcher {
        WebFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_text_drops_script_and_style() {
        let text = extract_text(PAGE);
        assert_eq!(text, "Test\nTitle\nThis is the main content.\nAnother paragraph.\nFooter content");
        assert!(!text.contains("console.log"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_text_inline_elements_stay_on_line() {
        let text = extract_text("<p>Ship <strong>faster</strong> with <a href='#'>us</a>.</p>");
        assert_eq!(text, "Ship faster with us.");
    }

    #[test]
    fn test_normalize_whitespace_splits_double_spaces() {
        let text = normalize_whitespace("  alpha  beta \n\n   \n gamma   delta");
        assert_eq!(text, "alpha\nbeta\ngamma\ndelta");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        let url = serve_once("HTTP/1.1 200 OK", "<html><body><p>Launch day!</p></body></html>");
        let text = fetcher().fetch_text(&url).await.unwrap();
        assert_eq!(text, "Launch day!");
    }

    #[tokio::test]
    async fn test_fetch_text_http_error() {
        let url = serve_once("HTTP/1.1 404 Not Found", "<html><body>missing</body></html>");
        let err = fetcher().fetch_text(&url).await.unwrap_err();
        assert!(matches!(err, CampaignError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_text_empty_page() {
        let url = serve_once("HTTP/1.1 200 OK", "<html><body><script>x()</script></body></html>");
        let err = fetcher().fetch_text(&url).await.unwrap_err();
        assert!(err.to_string().contains("no text content"));
    }

    #[tokio::test]
    async fn test_fetch_text_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher().fetch_text(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, CampaignError::Fetch { .. }));
    }
}
