use std::time::Duration;

use mime::Mime;
use reqwest::header::HeaderMap;
use url::Url;

use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub user_agent: Option<String>,
  pub timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      user_agent: None,
      timeout: default_timeout(),
    }
  }
}

impl ClientConfig {
  fn to_builder(&self) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder();

    if let Some(user_agent) = &self.user_agent {
      builder = builder.user_agent(user_agent);
    } else {
      builder = builder.user_agent(crate::util::USER_AGENT);
    }

    let mut header_map = HeaderMap::new();
    header_map.append(
      "Accept",
      reqwest::header::HeaderValue::from_static(
        "application/rss+xml,application/xml,text/xml",
      ),
    );
    builder = builder.default_headers(header_map);

    builder.timeout(self.timeout)
  }

  pub fn build(&self) -> FetchResult<Client> {
    let client = self.to_builder().build()?;
    Ok(Client { client })
  }
}

pub struct Client {
  client: reqwest::Client,
}

impl Client {
  pub async fn get(&self, url: &Url) -> FetchResult<Response> {
    #[cfg(test)]
    if url.scheme() == "fixture" {
      return Response::from_fixture(url);
    }

    let resp = self.client.get(url.clone()).send().await?;
    Response::from_reqwest_resp(resp).await
  }
}

pub struct Response {
  url: Url,
  status: reqwest::StatusCode,
  headers: HeaderMap,
  body: Vec<u8>,
}

impl Response {
  async fn from_reqwest_resp(resp: reqwest::Response) -> FetchResult<Self> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let url = resp.url().clone();
    let body = resp.bytes().await?.to_vec();

    Ok(Self {
      url,
      status,
      headers,
      body,
    })
  }

  #[cfg(test)]
  fn from_fixture(url: &Url) -> FetchResult<Self> {
    use std::path::PathBuf;

    let path: PathBuf =
      format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), url.path()).into();
    let body = std::fs::read(&path)
      .map_err(|_| FetchError::Fixture(path.display().to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      "content-type",
      reqwest::header::HeaderValue::from_static("text/xml; charset=utf-8"),
    );

    Ok(Self {
      url: url.clone(),
      status: reqwest::StatusCode::OK,
      headers,
      body,
    })
  }

  pub fn error_for_status(self) -> FetchResult<Self> {
    if self.status.is_success() {
      Ok(self)
    } else {
      Err(FetchError::Status(self.status, self.url))
    }
  }

  pub fn content_type(&self) -> Option<Mime> {
    self
      .headers
      .get("content-type")
      .and_then(|x| x.to_str().ok())
      .and_then(|x| x.parse::<Mime>().ok())
  }

  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn body(&self) -> &[u8] {
    &self.body
  }
}

pub fn default_timeout() -> Duration {
  Duration::from_secs(10)
}
