// src/domain.rs
//! Reachability and mail-hosting checks for the email's domain

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::name_server::TokioConnectionProvider;
use tracing::{debug, warn};

use crate::report::{DomainInfo, MailHosting};
use crate::transport::ProbeTransport;

/// MX lookup capability
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Mail exchangers for `domain`, formatted as "preference exchange"
    async fn resolve_mx(&self, domain: &str) -> anyhow::Result<Vec<String>>;
}

/// MX lookups through the system resolver configuration
pub struct SystemMxResolver {
    resolver: TokioResolver,
}

impl SystemMxResolver {
    /// `None` when no resolver can be configured on this host
    pub fn new() -> Option<Self> {
        match TokioResolver::builder(TokioConnectionProvider::default()) {
            Ok(builder) => Some(Self {
                resolver: builder.build(),
            }),
            Err(e) => {
                warn!("DNS resolution unavailable: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl MxResolver for SystemMxResolver {
    async fn resolve_mx(&self, domain: &str) -> anyhow::Result<Vec<String>> {
        let response = self.resolver.mx_lookup(domain).await?;
        Ok(response
            .iter()
            .map(|mx| format!("{} {}", mx.preference(), mx.exchange()))
            .collect())
    }
}

pub struct DomainAnalyzer {
    resolver: Option<Box<dyn MxResolver>>,
}

impl DomainAnalyzer {
    pub fn new(resolver: Option<Box<dyn MxResolver>>) -> Self {
        Self { resolver }
    }

    /// Analyzer backed by the system resolver when one is available
    pub fn system() -> Self {
        Self::new(
            SystemMxResolver::new().map(|resolver| Box::new(resolver) as Box<dyn MxResolver>),
        )
    }

    /// Run both checks. Never fails; each check degrades on its own.
    pub async fn analyze(&self, transport: &ProbeTransport, domain: &str) -> DomainInfo {
        let website_accessible = match transport.fetch(&format!("http://{}", domain)).await {
            Ok(response) => response.status == 200,
            Err(e) => {
                debug!("Domain {} not reachable: {}", domain, e);
                false
            }
        };

        let email_hosted = match &self.resolver {
            None => MailHosting::Unknown,
            Some(resolver) => match resolver.resolve_mx(domain).await {
                Ok(records) => {
                    debug!("MX records for {}: {:?}", domain, records);
                    MailHosting::Hosted(!records.is_empty())
                }
                Err(e) => {
                    debug!("MX lookup for {} failed: {}", domain, e);
                    MailHosting::Hosted(false)
                }
            },
        };

        DomainInfo {
            domain: domain.to_string(),
            website_accessible,
            email_hosted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{FetchResponse, Fetcher, TransportError};

    struct StatusFetcher(Option<u16>);

    #[async_trait]
    impl Fetcher for StatusFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
            assert_eq!(url, "http://example.com");
            match self.0 {
                Some(status) => Ok(FetchResponse::new(status, "")),
                None => Err(TransportError::Request {
                    url: url.to_string(),
                    reason: "dns error".to_string(),
                }),
            }
        }
    }

    struct FixedMx(Option<Vec<&'static str>>);

    #[async_trait]
    impl MxResolver for FixedMx {
        async fn resolve_mx(&self, _domain: &str) -> anyhow::Result<Vec<String>> {
            match &self.0 {
                Some(records) => Ok(records.iter().map(|r| r.to_string()).collect()),
                None => anyhow::bail!("SERVFAIL"),
            }
        }
    }

    fn transport(status: Option<u16>) -> ProbeTransport {
        ProbeTransport::fetch_only(Box::new(StatusFetcher(status)))
    }

    #[tokio::test]
    async fn test_reachable_with_mx() {
        let analyzer = DomainAnalyzer::new(Some(Box::new(FixedMx(Some(vec!["10 mx.example.com."])))));
        let info = analyzer.analyze(&transport(Some(200)), "example.com").await;

        assert_eq!(info.domain, "example.com");
        assert!(info.website_accessible);
        assert_eq!(info.email_hosted, MailHosting::Hosted(true));
    }

    #[tokio::test]
    async fn test_unreachable_and_lookup_error() {
        let analyzer = DomainAnalyzer::new(Some(Box::new(FixedMx(None))));
        let info = analyzer.analyze(&transport(None), "example.com").await;

        assert!(!info.website_accessible);
        assert_eq!(info.email_hosted, MailHosting::Hosted(false));
    }

    #[tokio::test]
    async fn test_redirect_is_not_accessible() {
        let analyzer = DomainAnalyzer::new(Some(Box::new(FixedMx(Some(vec![])))));
        let info = analyzer.analyze(&transport(Some(301)), "example.com").await;

        assert!(!info.website_accessible);
        assert_eq!(info.email_hosted, MailHosting::Hosted(false));
    }

    #[tokio::test]
    async fn test_no_resolver_is_unknown() {
        let analyzer = DomainAnalyzer::new(None);
        let info = analyzer.analyze(&transport(Some(200)), "example.com").await;
        assert_eq!(info.email_hosted, MailHosting::Unknown);
    }
}
