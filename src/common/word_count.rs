use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_tracing::TracingMiddleware;
use scraper::{Html, Selector};

use crate::common::errors::FetchError;
use crate::common::errors::FetchError::{NonOkStatus, NotADocument};
use crate::configuration::FetchSettings;

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Elements whose text is not rendered as page content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// Fetch remote pages and count their words.
#[derive(Clone)]
pub struct WordCounter {
    client: ClientWithMiddleware,
}

impl WordCounter {
    pub fn new(client: reqwest::Client) -> Self {
        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .build();

        WordCounter { client }
    }

    pub fn from_settings(settings: &FetchSettings) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self::new(client))
    }

    /// Download the page at `url` and count the words of its text.
    ///
    /// A single attempt is made, timeouts are the ones of the underlying client.
    #[tracing::instrument(skip(self))]
    pub async fn count_words(&self, url: &str) -> Result<i64, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(NonOkStatus(response.status().as_u16()));
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type
                .to_str()
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !HTML_CONTENT_TYPES.iter().any(|x| content_type.contains(x)) {
                return Err(NotADocument(content_type));
            }
        }

        let content = response.bytes().await?;
        let word_count = count_words(&extract_text(&String::from_utf8_lossy(&content)));
        tracing::debug!(word_count, "Counted words of {}", url);

        Ok(word_count as i64)
    }
}

/// Text content of the body of an HTML document, entities decoded.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    root.descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |element| SKIPPED_ELEMENTS.contains(&element.name()))
            })
        })
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect()
}

/// Number of tokens of `text` once trimmed, separated by the space character only.
///
/// Tabs and new lines do not separate words, and an empty text counts as one token.
pub fn count_words(text: &str) -> usize {
    text.trim().split(' ').count()
}
