use crate::config::ProbeConfig;
use crate::domain::model::ProbeOutcome;
use crate::domain::ports::Prober;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::error::Error as _;
use std::time::{Duration, Instant};

/// HEAD-only prober backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut builder = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(config.max_redirects));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();
        tracing::debug!("HEAD {}", url);

        match self.client.head(url).send().await {
            Ok(response) => ProbeOutcome::Success {
                code: response.status().as_u16(),
                elapsed: started.elapsed(),
            },
            Err(e) if e.is_timeout() => {
                tracing::debug!("Probe to {} timed out after {:?}", url, self.timeout);
                ProbeOutcome::Timeout
            }
            Err(e) => ProbeOutcome::TransportFailure {
                detail: describe(&e),
                elapsed: started.elapsed(),
            },
        }
    }
}

// reqwest's top-level message hides the cause (DNS, refused, TLS), so walk the chain.
fn describe(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}
