// src/platforms/site.rs
//! Table-driven platform probes
//!
//! Each platform is a URL template, a detection rule and an optional
//! enrichment. The not-found markers are literal heuristics: a redesigned
//! error page on the platform side silently turns misses into hits.

use async_trait::async_trait;

use super::{activity, PlatformProbe, ProbeOutcome, ProbeResult};
use crate::report::ActivityItem;
use crate::transport::{FetchResponse, ProbeTransport};

/// How existence is decided from the platform's response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Plain fetch: exists when the status is accepted and no marker appears
    Fetched { accepted: &'static [u16] },
    /// JavaScript-rendered page: exists when no marker appears in the source
    Rendered,
}

/// Deep-scan source for a confirmed profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    GithubEvents,
    RedditComments,
    RenderedPosts,
}

/// A platform described by data rather than code
#[derive(Debug, Clone)]
pub struct SiteProbe {
    pub name: &'static str,
    pub url_template: &'static str,
    pub detection: Detection,
    /// Lower-case markers that only appear on the platform's "no such user" page
    pub not_found_markers: &'static [&'static str],
    pub enrichment: Option<Enrichment>,
}

/// The built-in platform set, in probing order
pub fn default_platforms() -> Vec<SiteProbe> {
    vec![
        SiteProbe {
            name: "Twitter",
            url_template: "https://twitter.com/{}",
            detection: Detection::Rendered,
            not_found_markers: &["this account doesn't exist", "not found", "404"],
            enrichment: Some(Enrichment::RenderedPosts),
        },
        SiteProbe {
            name: "GitHub",
            url_template: "https://github.com/{}",
            detection: Detection::Fetched { accepted: &[200] },
            not_found_markers: &["page not found"],
            enrichment: Some(Enrichment::GithubEvents),
        },
        SiteProbe {
            name: "Reddit",
            url_template: "https://www.reddit.com/user/{}",
            detection: Detection::Fetched { accepted: &[200] },
            not_found_markers: &["sorry, nobody on reddit goes by that name"],
            enrichment: Some(Enrichment::RedditComments),
        },
        SiteProbe {
            name: "Instagram",
            url_template: "https://instagram.com/{}",
            detection: Detection::Rendered,
            not_found_markers: &["sorry, this page isn't available", "not found", "404"],
            enrichment: None,
        },
        SiteProbe {
            name: "LinkedIn",
            url_template: "https://linkedin.com/in/{}",
            // 999 is LinkedIn's bot wall, served for real profiles too
            detection: Detection::Fetched { accepted: &[200, 999] },
            not_found_markers: &["page not found"],
            enrichment: None,
        },
        SiteProbe {
            name: "Facebook",
            url_template: "https://www.facebook.com/{}",
            detection: Detection::Fetched { accepted: &[200] },
            not_found_markers: &["this content isn't available"],
            enrichment: None,
        },
    ]
}

impl SiteProbe {
    fn has_marker(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.not_found_markers.iter().any(|marker| body.contains(marker))
    }

    /// Existence rule for a plain fetch
    pub fn fetched_exists(&self, response: &FetchResponse) -> bool {
        match self.detection {
            Detection::Fetched { accepted } => {
                accepted.contains(&response.status) && !self.has_marker(&response.body)
            }
            Detection::Rendered => response.status == 200 && !self.has_marker(&response.body),
        }
    }

    /// Existence rule for a rendered page source
    pub fn source_exists(&self, source: &str) -> bool {
        !self.has_marker(source)
    }
}

#[async_trait]
impl PlatformProbe for SiteProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn profile_url(&self, username: &str) -> String {
        self.url_template.replace("{}", username)
    }

    async fn probe(&self, transport: &ProbeTransport, username: &str) -> ProbeResult {
        let url = self.profile_url(username);

        let outcome = match self.detection {
            Detection::Fetched { .. } => match transport.fetch(&url).await {
                Ok(response) if self.fetched_exists(&response) => ProbeOutcome::Exists,
                Ok(_) => ProbeOutcome::NotFound,
                Err(e) => ProbeOutcome::TransportFailure(e),
            },
            Detection::Rendered => match transport.page_source(&url).await {
                Ok(Some(source)) if self.source_exists(&source) => ProbeOutcome::Exists,
                Ok(_) => ProbeOutcome::NotFound,
                Err(e) => ProbeOutcome::TransportFailure(e),
            },
        };

        ProbeResult {
            platform: self.name.to_string(),
            variant: username.to_string(),
            url,
            outcome,
            detail: None,
        }
    }

    async fn enrich(
        &self,
        transport: &ProbeTransport,
        username: &str,
    ) -> anyhow::Result<Vec<ActivityItem>> {
        match self.enrichment {
            None => Ok(Vec::new()),
            Some(Enrichment::GithubEvents) => activity::github_events(transport, username).await,
            Some(Enrichment::RedditComments) => activity::reddit_comments(transport, username).await,
            Some(Enrichment::RenderedPosts) => {
                let html = transport.render(&self.profile_url(username)).await?;
                Ok(activity::parse_rendered_posts(&html))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Fetcher, Renderer, TransportError};
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, FetchResponse>);

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
            self.0.get(url).cloned().ok_or_else(|| TransportError::Request {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct PageRenderer(&'static str);

    #[async_trait]
    impl Renderer for PageRenderer {
        async fn render(&self, _url: &str) -> Result<String, TransportError> {
            Ok(self.0.to_string())
        }

        async fn close(&self) {}
    }

    fn platform(name: &str) -> SiteProbe {
        default_platforms()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    fn fetch_transport(pages: &[(&str, u16, &str)]) -> ProbeTransport {
        let map = pages
            .iter()
            .map(|(url, status, body)| (url.to_string(), FetchResponse::new(*status, *body)))
            .collect();
        ProbeTransport::fetch_only(Box::new(MapFetcher(map)))
    }

    #[test]
    fn test_default_platform_set() {
        let names: Vec<_> = default_platforms().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["Twitter", "GitHub", "Reddit", "Instagram", "LinkedIn", "Facebook"]
        );
    }

    #[test]
    fn test_profile_urls() {
        assert_eq!(platform("GitHub").profile_url("janedoe"), "https://github.com/janedoe");
        assert_eq!(
            platform("Reddit").profile_url("janedoe"),
            "https://www.reddit.com/user/janedoe"
        );
        assert_eq!(platform("LinkedIn").profile_url("jd"), "https://linkedin.com/in/jd");
    }

    #[tokio::test]
    async fn test_github_status_200_exists() {
        let transport = fetch_transport(&[("https://github.com/janedoe", 200, "<title>janedoe</title>")]);
        let result = platform("GitHub").probe(&transport, "janedoe").await;
        assert!(result.exists());
        assert_eq!(result.url, "https://github.com/janedoe");
    }

    #[tokio::test]
    async fn test_github_marker_means_not_found() {
        let transport = fetch_transport(&[("https://github.com/janedoe", 200, "<h1>Page not found</h1>")]);
        let result = platform("GitHub").probe(&transport, "janedoe").await;
        assert_eq!(result.outcome, ProbeOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_reddit_not_found_message() {
        let transport = fetch_transport(&[(
            "https://www.reddit.com/user/janedoe",
            200,
            "Sorry, nobody on Reddit goes by that name.",
        )]);
        let result = platform("Reddit").probe(&transport, "janedoe").await;
        assert!(!result.exists());
    }

    #[tokio::test]
    async fn test_linkedin_accepts_999() {
        let transport = fetch_transport(&[("https://linkedin.com/in/janedoe", 999, "")]);
        assert!(platform("LinkedIn").probe(&transport, "janedoe").await.exists());

        let transport = fetch_transport(&[("https://linkedin.com/in/janedoe", 999, "")]);
        assert!(!platform("GitHub").probe(&transport, "janedoe").await.exists());
    }

    #[tokio::test]
    async fn test_facebook_unavailable_content() {
        let transport = fetch_transport(&[(
            "https://www.facebook.com/janedoe",
            200,
            "This content isn't available right now",
        )]);
        assert!(!platform("Facebook").probe(&transport, "janedoe").await.exists());
    }

    #[tokio::test]
    async fn test_transport_failure_outcome() {
        let transport = fetch_transport(&[]);
        let result = platform("Facebook").probe(&transport, "janedoe").await;
        assert!(matches!(result.outcome, ProbeOutcome::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_rendered_detection_uses_browser() {
        let transport = ProbeTransport::new(
            Box::new(MapFetcher(HashMap::new())),
            Some(Box::new(PageRenderer("<div>Jane Doe (@janedoe)</div>"))),
        );
        assert!(platform("Twitter").probe(&transport, "janedoe").await.exists());

        let transport = ProbeTransport::new(
            Box::new(MapFetcher(HashMap::new())),
            Some(Box::new(PageRenderer("<span>This account doesn't exist</span><p>Not Found</p>"))),
        );
        assert!(!platform("Twitter").probe(&transport, "janedoe").await.exists());

        for name in ["Twitter", "Instagram"] {
            let transport = ProbeTransport::new(
                Box::new(MapFetcher(HashMap::new())),
                Some(Box::new(PageRenderer("<title>Error 404</title>"))),
            );
            assert!(!platform(name).probe(&transport, "janedoe").await.exists());
        }
    }

    #[tokio::test]
    async fn test_rendered_detection_falls_back_to_fetch() {
        let transport = fetch_transport(&[("https://instagram.com/janedoe", 200, "<html>profile</html>")]);
        assert!(platform("Instagram").probe(&transport, "janedoe").await.exists());

        let transport = fetch_transport(&[("https://instagram.com/janedoe", 404, "<html></html>")]);
        assert!(!platform("Instagram").probe(&transport, "janedoe").await.exists());
    }

    #[tokio::test]
    async fn test_rendered_enrichment_requires_browser() {
        let transport = fetch_transport(&[]);
        assert!(platform("Twitter").enrich(&transport, "janedoe").await.is_err());
    }

    #[tokio::test]
    async fn test_enrichment_none_is_empty() {
        let transport = fetch_transport(&[]);
        let items = platform("Facebook").enrich(&transport, "janedoe").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_github_enrichment() {
        let transport = fetch_transport(&[(
            "https://api.github.com/users/janedoe/events/public?per_page=10",
            200,
            r#"[{"type":"PushEvent","repo":{"name":"janedoe/dotfiles"},"created_at":"2024-01-01T00:00:00Z"}]"#,
        )]);
        let items = platform("GitHub").enrich(&transport, "janedoe").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "PushEvent on janedoe/dotfiles");
    }
}
