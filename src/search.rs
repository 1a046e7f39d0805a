// src/search.rs
//! Public mention search across several search engines

use scraper::{Html, Selector};
use tracing::debug;

use crate::identity::Identity;
use crate::progress::ProgressTracker;
use crate::transport::ProbeTransport;

/// Outbound links kept per engine per query
pub const LINKS_PER_QUERY: usize = 3;

/// Substrings that mark a link as pointing back at a search engine
const SELF_REFERENCES: &[&str] = &["google", "bing", "duckduckgo"];

/// Sites whose user-generated content often leaks addresses
const SCOPED_SITES: &[&str] = &["github.com", "twitter.com", "pastebin.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEngine {
    pub name: &'static str,
    pub url_template: &'static str,
}

/// Links collected from one engine, in query order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSet {
    pub engine: String,
    pub links: Vec<String>,
}

pub fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine {
            name: "Google",
            url_template: "https://www.google.com/search?q={}",
        },
        SearchEngine {
            name: "Bing",
            url_template: "https://www.bing.com/search?q={}",
        },
        SearchEngine {
            name: "DuckDuckGo",
            url_template: "https://duckduckgo.com/?q={}",
        },
    ]
}

pub struct MentionSearcher {
    engines: Vec<SearchEngine>,
}

impl MentionSearcher {
    pub fn new(engines: Vec<SearchEngine>) -> Self {
        Self { engines }
    }

    /// The fixed query list for an identity
    pub fn queries(identity: &Identity) -> Vec<String> {
        let email = identity.email();
        let mut queries = vec![
            format!("\"{}\"", email),
            format!("\"{}\"", identity.base_username()),
        ];
        queries.extend(
            SCOPED_SITES
                .iter()
                .map(|site| format!("site:{} \"{}\"", site, email)),
        );
        queries
    }

    /// Run every query on every engine.
    ///
    /// Failed or non-200 lookups contribute nothing. Engines that produced no
    /// links are still returned, with an empty list.
    pub async fn search(
        &self,
        transport: &ProbeTransport,
        identity: &Identity,
        progress: &ProgressTracker,
    ) -> Vec<MentionSet> {
        let queries = Self::queries(identity);
        let mut results = Vec::with_capacity(self.engines.len());

        for engine in &self.engines {
            progress.task(&format!("Searching {}", engine.name), 3);

            let mut links = Vec::new();
            for query in &queries {
                let url = engine.url_template.replace("{}", &encode_query(query));
                match transport.fetch(&url).await {
                    Ok(response) if response.status == 200 => {
                        let found = extract_links(&response.body, LINKS_PER_QUERY);
                        debug!("{} [{}]: {} links", engine.name, query, found.len());
                        links.extend(found);
                    }
                    Ok(response) => {
                        debug!("{} [{}]: HTTP {}", engine.name, query, response.status);
                    }
                    Err(e) => debug!("{} [{}]: {}", engine.name, query, e),
                }
            }

            results.push(MentionSet {
                engine: engine.name.to_string(),
                links,
            });
        }

        results
    }
}

impl Default for MentionSearcher {
    fn default() -> Self {
        Self::new(default_engines())
    }
}

/// Form-encode a query the way search engines expect (`+` for spaces)
pub fn encode_query(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Absolute outbound links from a result page, at most `limit`
pub fn extract_links(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .filter(|href| !SELF_REFERENCES.iter().any(|engine| href.contains(engine)))
        .take(limit)
        .map(str::to_string)
        .collect()
}
