// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub REST implementation of SourceControl (list commits in a window, list statuses for a ref)
// role: gateway/github
// inputs: API base URL from config; token from GITHUB_ACCESS_TOKEN (fallback GITHUB_TOKEN)
// outputs: Typed Commit and CommitStatus values
// side_effects: Network calls to the configured GitHub API
// invariants:
// - Token discovery happens before any request; absence is ReportError::Auth
// - Commit listing follows Link rel="next" pages of 100 until exhausted (at most MAX_COMMIT_PAGES)
// - sha, commit.message and commit.author.date must exist on every listed commit
// errors: ReportError::Gateway for transport, HTTP and payload-shape failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, SecondsFormat, Utc};

use super::{build_agent, env_token, parse_base_url, read_json, read_json_page, SourceControl, USER_AGENT};
use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::{Commit, CommitStatus};

pub const TOKEN_VARS: &[&str] = &["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];
const COMMITS_PER_PAGE: u32 = 100;
const MAX_COMMIT_PAGES: usize = 100;

/// Discover the GitHub token: GITHUB_ACCESS_TOKEN first, then GITHUB_TOKEN.
pub fn github_token_from_env() -> Result<String> {
  env_token(TOKEN_VARS).ok_or_else(|| ReportError::Auth(format!("set {} to a GitHub access token", TOKEN_VARS[0])))
}

pub struct GithubHttpApi {
  base_url: url::Url,
  token: String,
  agent: ureq::Agent,
}

impl std::fmt::Debug for GithubHttpApi {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GithubHttpApi")
      .field("base_url", &self.base_url.as_str())
      .field("token", &"[REDACTED]")
      .finish()
  }
}

impl GithubHttpApi {
  pub fn new(base_url: &str, token: String) -> Result<Self> {
    Ok(Self {
      base_url: parse_base_url(base_url)?,
      token,
      agent: build_agent(),
    })
  }

  fn endpoint(&self, segments: &[&str]) -> Result<url::Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ReportError::gateway(format!("API base URL {} cannot carry a path", self.base_url)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn get(&self, url: &url::Url) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    tracing::debug!(url = %url, "GET");
    self
      .agent
      .get(url.as_str())
      .header("Accept", "application/vnd.github+json")
      .header("User-Agent", USER_AGENT)
      .header("Authorization", &format!("Bearer {}", self.token))
      .call()
  }

  fn get_json(&self, what: &str, url: &url::Url) -> Result<serde_json::Value> {
    read_json(what, self.get(url))
  }
}

fn api_time(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_commit(item: &serde_json::Value) -> Result<Commit> {
  let sha = item.fetch("sha").require::<String>("commit")?;
  let date = item.fetch("commit.author.date").require::<String>("commit")?;
  let message = item.fetch("commit.message").require::<String>("commit")?;

  let author_date = DateTime::parse_from_rfc3339(&date)
    .map_err(|e| ReportError::gateway(format!("commit {} has unparsable author date {:?}: {}", sha, date, e)))?
    .with_timezone(&Utc);

  Ok(Commit {
    sha,
    author_date,
    message,
  })
}

impl SourceControl for GithubHttpApi {
  fn list_commits(
    &self,
    owner: &str,
    repository: &str,
    branch: &str,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<Commit>> {
    let mut url = self.endpoint(&["repos", owner, repository, "commits"])?;
    url
      .query_pairs_mut()
      .append_pair("sha", branch)
      .append_pair("since", &api_time(since))
      .append_pair("until", &api_time(until))
      .append_pair("per_page", &COMMITS_PER_PAGE.to_string());

    let mut commits = Vec::new();
    let mut page = Some(url);
    let mut fetched = 0;

    while let Some(url) = page.take() {
      if fetched == MAX_COMMIT_PAGES {
        return Err(ReportError::gateway(format!(
          "list commits did not finish after {} pages",
          MAX_COMMIT_PAGES
        )));
      }

      let (v, next) = read_json_page("list commits", self.get(&url))?;
      let Some(arr) = v.as_array() else {
        return Err(ReportError::gateway("list commits response is not an array"));
      };
      for item in arr {
        commits.push(parse_commit(item)?);
      }
      fetched += 1;
      tracing::debug!(page = fetched, total = commits.len(), more = next.is_some(), "listed commits page");

      page = next
        .map(|n| {
          url::Url::parse(&n).map_err(|e| ReportError::gateway(format!("list commits: bad next link {:?}: {}", n, e)))
        })
        .transpose()?;
    }

    Ok(commits)
  }

  fn list_statuses(
    &self,
    owner: &str,
    repository: &str,
    reference: &str,
    page: u32,
    per_page: u32,
  ) -> Result<Vec<CommitStatus>> {
    let mut url = self.endpoint(&["repos", owner, repository, "commits", reference, "statuses"])?;
    url
      .query_pairs_mut()
      .append_pair("page", &page.to_string())
      .append_pair("per_page", &per_page.to_string());

    let v = self.get_json("list statuses", &url)?;

    serde_json::from_value::<Vec<CommitStatus>>(v)
      .map_err(|e| ReportError::gateway(format!("list statuses response for {}: {}", reference, e)))
  }
}
