//! GitHub activity feed via the `gh` CLI.
//!
//! Fetches a user's public event stream with `gh api` and condenses it to
//! one row per interesting event. Event types that are pure noise in a
//! daily review (stars, forks, ref creation, review chatter) are dropped,
//! as are closed pull requests.

use std::collections::BTreeSet;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tokio::process::Command;

/// Event types dropped from the feed.
const FILTERED_EVENTS: &[&str] = &[
    "WatchEvent",
    "ForkEvent",
    "CreateEvent",
    "PullRequestReviewEvent",
    "PullRequestReviewCommentEvent",
];

/// One condensed feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub repo: String,
    pub kind: String,
    pub summary: String,
}

/// Fetches and condenses the event feed for `user`.
pub async fn fetch_events(user: &str) -> Result<Vec<ActivityEvent>> {
    let output = Command::new("gh")
        .args([
            "api",
            "-H",
            "Accept: application/vnd.github+json",
            &format!("/users/{user}/events?per_page=100"),
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .context("spawn gh api")?;
    if !output.status.success() {
        bail!(
            "gh api exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    parse_events(&String::from_utf8_lossy(&output.stdout))
}

/// Parses the raw `gh api` JSON into condensed entries.
pub fn parse_events(json: &str) -> Result<Vec<ActivityEvent>> {
    let events: Vec<Value> = serde_json::from_str(json).context("parse gh api output")?;
    Ok(events
        .iter()
        .filter(|event| keep(event))
        .map(|event| {
            let repo = event["repo"]["name"].as_str().unwrap_or("?").to_string();
            let kind = event["type"].as_str().unwrap_or("?");
            ActivityEvent {
                repo,
                kind: kind.trim_end_matches("Event").to_string(),
                summary: summarize(event),
            }
        })
        .collect())
}

/// Repositories appearing in the feed, deduplicated and sorted.
pub fn recent_repos(events: &[ActivityEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| event.repo.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn keep(event: &Value) -> bool {
    let Some(kind) = event["type"].as_str() else {
        return false;
    };
    if FILTERED_EVENTS.contains(&kind) {
        return false;
    }
    if kind == "PullRequestEvent" {
        return event["payload"]["action"].as_str() != Some("closed");
    }
    true
}

/// A one-line description of the event payload.
fn summarize(event: &Value) -> String {
    let payload = &event["payload"];
    match event["type"].as_str().unwrap_or_default() {
        "PushEvent" => {
            let commit = &payload["commits"][0];
            let author = commit["author"]["name"].as_str().unwrap_or("?");
            let message = commit["message"].as_str().unwrap_or("").lines().next();
            format!("commit by {author}: {}", message.unwrap_or(""))
        }
        "IssueCommentEvent" => {
            let commenter = payload["comment"]["user"]["login"].as_str().unwrap_or("?");
            format!("comment by {commenter}")
        }
        "PullRequestEvent" => {
            let pr = &payload["pull_request"];
            let requester = pr["user"]["login"].as_str().unwrap_or("?");
            let title = pr["title"].as_str().unwrap_or("");
            format!("PR by {requester}: {title}")
        }
        kind => spaced_event_name(kind.trim_end_matches("Event")),
    }
}

/// `IssueComment` becomes `Issue Comment`.
fn spaced_event_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn push_event(repo: &str, author: &str, message: &str) -> Value {
        json!({
            "type": "PushEvent",
            "repo": {"name": repo},
            "payload": {"commits": [{"author": {"name": author}, "message": message, "url": "u"}]},
        })
    }

    #[test]
    fn parses_and_summarizes_pushes() {
        let feed = json!([push_event("par/slurm-tools", "Pedro", "fix viewport\n\ndetails")]);
        let events = parse_events(&feed.to_string()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].repo, "par/slurm-tools");
        assert_eq!(events[0].kind, "Push");
        assert_eq!(events[0].summary, "commit by Pedro: fix viewport");
    }

    #[test]
    fn drops_noise_event_types() {
        let feed = json!([
            {"type": "WatchEvent", "repo": {"name": "a/b"}, "payload": {}},
            {"type": "ForkEvent", "repo": {"name": "a/b"}, "payload": {}},
            push_event("a/b", "x", "m"),
        ]);
        let events = parse_events(&feed.to_string()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "Push");
    }

    #[test]
    fn drops_closed_pull_requests_but_keeps_open_ones() {
        let pr = |action: &str| {
            json!({
                "type": "PullRequestEvent",
                "repo": {"name": "a/b"},
                "payload": {
                    "action": action,
                    "pull_request": {"user": {"login": "dev"}, "title": "Add thing"},
                },
            })
        };
        let feed = json!([pr("closed"), pr("opened")]);
        let events = parse_events(&feed.to_string()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "PR by dev: Add thing");
    }

    #[test]
    fn unknown_events_get_spaced_names() {
        let feed = json!([
            {"type": "IssuesEvent", "repo": {"name": "a/b"}, "payload": {}},
            {"type": "GollumEvent", "repo": {"name": "a/b"}, "payload": {}},
        ]);
        let events = parse_events(&feed.to_string()).unwrap();
        assert_eq!(events[0].summary, "Issues");
        assert_eq!(events[1].summary, "Gollum");
        assert_eq!(spaced_event_name("IssueComment"), "Issue Comment");
    }

    #[test]
    fn recent_repos_dedupes() {
        let feed = json!([
            push_event("a/b", "x", "m"),
            push_event("c/d", "x", "m"),
            push_event("a/b", "x", "m"),
        ]);
        let events = parse_events(&feed.to_string()).unwrap();
        assert_eq!(recent_repos(&events), ["a/b", "c/d"]);
    }
}
