use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use tracing::{debug, error};

use crate::agent::error::AgentError;
use crate::agent::input_types::PageSnapshot;
use crate::config::FetchConfig;

const NO_TITLE: &str = "No title found";

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").unwrap());
static META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\s[^>]*>").unwrap());
static META_NAME_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|\s)name\s*=\s*["']?description["'\s/>]"#).unwrap());
static META_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static HIDDEN_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style|noscript|template)\b[^>]*>.*?</(?:script|style|noscript|template)\s*>")
        .unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Fetches a page so the site audit has something to critique
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageSnapshot, AgentError>;
}

/// [`PageFetcher`] over plain HTTP with a browser-like user agent
pub struct HttpPageFetcher {
    client: Client,
    excerpt_chars: usize,
    max_page_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AgentError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            excerpt_chars: config.excerpt_chars,
            max_page_bytes: config.max_page_bytes,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<PageSnapshot, AgentError> {
        let url = normalize_url(url);
        debug!("Fetching page: {}", url);

        let html = async {
            let response = self.client.get(&url).send().await?.error_for_status()?;
            read_capped(response, self.max_page_bytes).await
        }
        .await
        .map_err(|e| {
            error!("Scraping failed: {}", e);
            AgentError::Fetch(e.to_string())
        })?;

        Ok(extract_page(&url, &html, self.excerpt_chars))
    }
}

/// Read at most `max_bytes` of the body, decoded with the declared charset (UTF-8 otherwise)
async fn read_capped(mut response: Response, max_bytes: usize) -> Result<String, reqwest::Error> {
    let encoding = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = max_bytes - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!("Page body truncated at {} bytes", max_bytes);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    let (text, _, _) = encoding.decode(&body);
    Ok(text.into_owned())
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Prepend `https://` when the user typed a bare host
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Pull the title, meta description and a bounded visible-text excerpt out of HTML
pub fn extract_page(url: &str, html: &str, excerpt_chars: usize) -> PageSnapshot {
    let title = TITLE
        .captures(html)
        .map(|caps| clean_text(&caps[1]))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description = META_TAG
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|tag| META_NAME_DESCRIPTION.is_match(tag))
        .and_then(|tag| META_CONTENT.captures(tag))
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default();

    let visible = COMMENT.replace_all(html, " ");
    let visible = HIDDEN_BLOCK.replace_all(&visible, " ");
    let visible = TAG.replace_all(&visible, " ");
    let excerpt: String = clean_text(&visible).chars().take(excerpt_chars).collect();

    PageSnapshot {
        url: url.to_string(),
        title,
        description,
        excerpt: excerpt.trim_end().to_string(),
    }
}

fn clean_text(text: &str) -> String {
    let decoded = decode_entities(text);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>
    Main Street &amp; Co Bakery
  </title>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width">
  <meta name="description" content="Fresh bread &quot;daily&quot;">
  <style>body { color: red; }</style>
  <script>var tracking = "<b>ignore me</b>";</script>
</head>
<body>
  <!-- hero -->
  <h1>Welcome</h1>
  <p>Sourdough,&nbsp;rye   and
     pastries.</p>
</body>
</html>"#;

    #[test]
    fn bare_hosts_get_https() {
        assert_eq!(normalize_url("onda.dev"), "https://onda.dev");
        assert_eq!(normalize_url(" http://onda.dev "), "http://onda.dev");
        assert_eq!(normalize_url("https://onda.dev/x"), "https://onda.dev/x");
        assert_eq!(normalize_url("HTTP://onda.dev"), "HTTP://onda.dev");
        assert_eq!(normalize_url("Https://onda.dev"), "Https://onda.dev");
    }

    #[test]
    fn extracts_title_description_and_text() {
        let page = extract_page("https://bakery.example", PAGE, 2000);
        assert_eq!(page.title, "Main Street & Co Bakery");
        assert_eq!(page.description, "Fresh bread \"daily\"");
        assert!(page.excerpt.contains("Welcome Sourdough, rye and pastries."));
        assert!(!page.excerpt.contains("tracking"));
        assert!(!page.excerpt.contains("color: red"));
        assert!(!page.excerpt.contains("hero"));
    }

    #[test]
    fn excerpt_is_bounded_in_characters() {
        let html = format!("<p>{}</p>", "ж".repeat(5000));
        let page = extract_page("https://x.example", &html, 2000);
        assert_eq!(page.excerpt.chars().count(), 2000);
    }

    #[test]
    fn missing_parts_use_defaults() {
        let page = extract_page("https://x.example", "<p>Just text</p>", 2000);
        assert_eq!(page.title, "No title found");
        assert_eq!(page.description, "");
        assert_eq!(page.excerpt, "Just text");
    }

    #[test]
    fn single_quoted_description_is_read() {
        let html = "<meta content='Hand-made soap' name='description'>";
        let page = extract_page("https://x.example", html, 2000);
        assert_eq!(page.description, "Hand-made soap");
    }

    #[test]
    fn data_attributes_are_not_the_description() {
        let html = r#"<meta data-name="description" content="Tracking blob">
<meta name="description" content="Hand-made soap">"#;
        let page = extract_page("https://soap.example", html, 100);
        assert_eq!(page.description, "Hand-made soap");
    }

    #[test]
    fn charset_is_read_from_content_type() {
        assert_eq!(charset_label("text/html; charset=windows-1251"), Some("windows-1251"));
        assert_eq!(charset_label("text/html; Charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_label("text/html"), None);
    }
}
