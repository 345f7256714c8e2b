//! Talking to the INSPIRE and arXiv services over HTTP.

use std::{thread, time::Duration};

use log::{trace, warn};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{config::Settings, Error, ErrorKind};

pub mod arxiv;
pub mod literature;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// A blocking HTTP client able to fetch a URL as text, JSON or raw bytes.
pub trait Client {
    /// Fetches the body of `url` as text.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Network`] when the request cannot be completed and [`ErrorKind::Api`] when
    /// the response status is not a success.
    fn get_text(&self, url: &str) -> Result<String, Error>;

    /// Fetches the body of `url` as raw bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Client::get_text`].
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Error>;

    /// Fetches the body of `url` and deserializes it from JSON.
    ///
    /// # Errors
    ///
    /// Same as [`Client::get_text`], and [`ErrorKind::Parse`] with the raw payload when the body
    /// is not the expected JSON.
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let text = self.get_text(url)?;
        serde_json::from_str(&text).map_err(|e| {
            Error::wrap_with(
                ErrorKind::Parse,
                e,
                format!("Unexpected response from '{url}':\n{text}"),
            )
        })
    }
}

/// The [`Client`] used to talk to the real services.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
    retry_server_errors: bool,
}

impl HttpClient {
    /// Creates a client using the timeout and retry policy of `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Network`] if the TLS backend cannot be initialised.
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let inner = reqwest::blocking::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::wrap_with(ErrorKind::Network, e, "Cannot create HTTP client"))?;

        Ok(Self {
            inner,
            retry_server_errors: settings.retry_server_errors,
        })
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, Error> {
        trace!("GET {url}");
        let resp = self.try_send(url)?;

        if should_retry(resp.status(), self.retry_server_errors) {
            warn!("'{url}' answered {} - retrying once", resp.status());
            thread::sleep(RETRY_DELAY);
            return self.try_send(url).and_then(check_status);
        }

        check_status(resp)
    }

    fn try_send(&self, url: &str) -> Result<reqwest::blocking::Response, Error> {
        self.inner
            .get(url)
            .send()
            .map_err(|e| Error::wrap_with(ErrorKind::Network, e, format!("GET {url} failed")))
    }
}

impl Client for HttpClient {
    fn get_text(&self, url: &str) -> Result<String, Error> {
        self.send(url)?
            .text()
            .map_err(|e| Error::wrap_with(ErrorKind::Network, e, "Cannot read response body"))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.send(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Error::wrap_with(ErrorKind::Network, e, "Cannot read response body"))
    }
}

/// A request is sent again once, and only after a server error.
fn should_retry(status: reqwest::StatusCode, retry_server_errors: bool) -> bool {
    retry_server_errors && status.is_server_error()
}

/// The structured error body of the INSPIRE API.
#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    Err(Error::new(ErrorKind::Api, api_message(status.as_u16(), &body)))
}

fn api_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiMessage>(body) {
        Ok(ApiMessage { message }) => format!("{status}: {message}"),
        Err(_) if body.trim().is_empty() => format!("{status}: no message"),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, MockClient, NetworkErrorProducer, Producer, URL_SINK,
};
