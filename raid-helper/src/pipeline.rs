use futures::future;
use log::info;

use crate::{normalize_payload, Config, EventRecord, SourceClient, TimeZoneResolver};

/// Fans out over the configured servers and collects their events into one
/// list ordered by start time.
#[derive(Debug, Clone)]
pub struct AggregationPipeline {
    client: SourceClient,
    resolver: TimeZoneResolver,
    source_ids: Vec<String>,
}

impl AggregationPipeline {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: SourceClient::new(config),
            resolver: TimeZoneResolver::new(&config.default_timezone),
            source_ids: config.source_ids.clone(),
        }
    }

    #[must_use]
    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    #[must_use]
    pub fn resolver(&self) -> TimeZoneResolver {
        self.resolver
    }

    /// Runs [`AggregationPipeline::fetch_all`] over the configured servers.
    pub async fn refresh(&self) -> Vec<EventRecord> {
        self.fetch_all(&self.source_ids).await
    }

    /// Fetches every source concurrently and returns all surviving records
    /// sorted by `unix_time`.
    ///
    /// The sort is stable: records sharing a timestamp keep the order of
    /// `source_ids`, then the order the upstream listed them in. Sources that
    /// fail contribute nothing; the result is empty, never an error, when no
    /// source delivered anything.
    pub async fn fetch_all<S: AsRef<str>>(&self, source_ids: &[S]) -> Vec<EventRecord> {
        let timezone = self.resolver.default_timezone().name();

        let per_source = future::join_all(
            source_ids
                .iter()
                .map(|source_id| self.fetch_source(source_id.as_ref(), timezone)),
        )
        .await;

        let mut events = per_source.into_iter().flatten().collect::<Vec<_>>();
        events.sort_by_key(|event| event.unix_time);

        info!(
            "Fetched {} events from {} servers",
            events.len(),
            source_ids.len()
        );

        events
    }

    async fn fetch_source(&self, source_id: &str, timezone: &str) -> Vec<EventRecord> {
        self.client
            .fetch(source_id)
            .await
            .map_or_else(Vec::new, |payload| {
                normalize_payload(payload, source_id, Some(timezone))
            })
    }
}

/// Server names in the order they first appear.
#[must_use]
pub fn server_names(events: &[EventRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for event in events {
        if !names.contains(&event.server_name) {
            names.push(event.server_name.clone());
        }
    }

    names
}
