//! HTTP adapter for the relay sink port.
//!
//! `post` never blocks the coordinator: each body is shipped on its own
//! spawned task and the classified [`RelayOutcome`] comes back through an
//! outcome channel, which the runtime bridges into the input queue.

use log::debug;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::mpsc;

use crate::ports::RelaySink;
use crate::relay::{self, RelayOutcome};

pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
    outcomes: mpsc::UnboundedSender<RelayOutcome>,
}

impl HttpRelay {
    /// Build the adapter and the receiving half of its outcome channel.
    /// Feed the receiver to
    /// [`bridge_relay_outcomes`](crate::runtime::bridge_relay_outcomes).
    pub fn new(url: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<RelayOutcome>) {
        let (outcomes, rx) = mpsc::unbounded_channel();
        (
            Self {
                client: reqwest::Client::new(),
                url: url.into(),
                outcomes,
            },
            rx,
        )
    }
}

impl RelaySink for HttpRelay {
    fn post(&mut self, body: String) {
        let client = self.client.clone();
        let url = self.url.clone();
        let outcomes = self.outcomes.clone();

        tokio::spawn(async move {
            let outcome = match client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    relay::classify(status, Some(&text))
                }
                Err(e) => RelayOutcome::TransportError(e.to_string()),
            };
            if outcomes.send(outcome).is_err() {
                debug!("relay outcome dropped, coordinator gone");
            }
        });
    }
}
