// src/platforms/activity.rs
//! Deep-scan extraction of recent public activity

use anyhow::{Context, Result};
use chrono::DateTime;
use scraper::{Html, Selector};
use serde_json::Value;

use super::MAX_ACTIVITY_FETCH;
use crate::report::ActivityItem;
use crate::transport::ProbeTransport;

/// Recent public GitHub events for `username`
pub async fn github_events(transport: &ProbeTransport, username: &str) -> Result<Vec<ActivityItem>> {
    let url = format!(
        "https://api.github.com/users/{}/events/public?per_page={}",
        username, MAX_ACTIVITY_FETCH
    );
    let response = transport.fetch(&url).await?;
    if response.status != 200 {
        anyhow::bail!("GitHub events returned HTTP {}", response.status);
    }
    parse_github_events(&response.body)
}

/// Recent Reddit comments for `username`
pub async fn reddit_comments(transport: &ProbeTransport, username: &str) -> Result<Vec<ActivityItem>> {
    let url = format!(
        "https://www.reddit.com/user/{}/comments.json?limit={}",
        username, MAX_ACTIVITY_FETCH
    );
    let response = transport.fetch(&url).await?;
    if response.status != 200 {
        anyhow::bail!("Reddit comments returned HTTP {}", response.status);
    }
    parse_reddit_comments(&response.body)
}

pub fn parse_github_events(body: &str) -> Result<Vec<ActivityItem>> {
    let json: Value = serde_json::from_str(body).context("Failed to parse GitHub events")?;
    let events = json.as_array().context("GitHub events response is not a list")?;

    Ok(events
        .iter()
        .take(MAX_ACTIVITY_FETCH)
        .filter_map(|event| {
            let kind = event["type"].as_str()?;
            let repo = event["repo"]["name"].as_str()?;
            Some(ActivityItem {
                text: format!("{} on {}", kind, repo),
                url: Some(format!("https://github.com/{}", repo)),
                created_at: event["created_at"].as_str().map(str::to_string),
            })
        })
        .collect())
}

pub fn parse_reddit_comments(body: &str) -> Result<Vec<ActivityItem>> {
    let json: Value = serde_json::from_str(body).context("Failed to parse Reddit listing")?;
    let children = json["data"]["children"]
        .as_array()
        .context("Reddit listing has no children")?;

    Ok(children
        .iter()
        .take(MAX_ACTIVITY_FETCH)
        .filter_map(|child| {
            let data = &child["data"];
            let body = data["body"].as_str()?;
            let text = match data["subreddit"].as_str() {
                Some(subreddit) => format!("r/{}: {}", subreddit, body),
                None => body.to_string(),
            };
            Some(ActivityItem {
                text,
                url: data["permalink"]
                    .as_str()
                    .map(|permalink| format!("https://www.reddit.com{}", permalink)),
                created_at: data["created_utc"]
                    .as_f64()
                    .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
                    .map(|ts| ts.to_rfc3339()),
            })
        })
        .collect())
}

/// Post texts from a rendered timeline
pub fn parse_rendered_posts(html: &str) -> Vec<ActivityItem> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("article div[lang]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .take(MAX_ACTIVITY_FETCH)
        .map(|text| ActivityItem {
            text,
            url: None,
            created_at: None,
        })
        .collect()
}
