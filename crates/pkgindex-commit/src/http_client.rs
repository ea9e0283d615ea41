use std::time::Duration;

use ureq::{http::HeaderMap, Agent, Proxy, RequestBuilder};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    /// `pkgindex/<version>` user agent; no proxy, extra headers or timeout.
    fn default() -> Self {
        Self {
            user_agent: Some(format!("pkgindex/{}", env!("CARGO_PKG_VERSION"))),
            proxy: None,
            headers: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    ///
    /// Non-success statuses are returned as ordinary responses rather than
    /// errors so the caller can read the server's explanation from the body.
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }

    /// Adds the configured extra headers to `req`.
    pub fn apply_headers<B>(&self, req: RequestBuilder<B>) -> RequestBuilder<B> {
        apply_headers(req, &self.headers)
    }
}

fn apply_headers<B>(mut req: RequestBuilder<B>, headers: &Option<HeaderMap>) -> RequestBuilder<B> {
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    req
}
