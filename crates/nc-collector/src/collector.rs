//! Per-scrape collection.
//!
//! Each call to `collect()` owns its snapshot and observations; the state
//! shared between concurrent scrapes is the pair of outcome counters and the
//! process sampler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use nc_metrics::{map_process, map_snapshot, Observation, Schema};

use crate::fetch::ServerInfoClient;
use crate::process::ProcessSampler;

/// Fetches serverinfo on demand and turns it into observations.
pub struct Collector {
    client: ServerInfoClient,
    schema: Arc<Schema>,
    process: ProcessSampler,
    /// Scrapes that produced data.
    requests_ok: AtomicU64,
    /// Scrapes that failed at any stage.
    requests_ko: AtomicU64,
}

impl Collector {
    pub fn new(client: ServerInfoClient, schema: Arc<Schema>) -> Self {
        Self {
            client,
            schema,
            process: ProcessSampler::new(),
            requests_ok: AtomicU64::new(0),
            requests_ko: AtomicU64::new(0),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run one scrape: fetch, decode, map.
    ///
    /// Always returns the `result_ok` gauge, both request counters and the
    /// `process_*` families. Data observations are present only when the
    /// scrape succeeded.
    pub async fn collect(&self) -> Vec<Observation<'_>> {
        let started = Instant::now();
        let schema = &*self.schema;

        let (mut out, result_ok) = match self.client.fetch().await {
            Ok(snapshot) => {
                self.requests_ok.fetch_add(1, Ordering::Relaxed);
                let observations = map_snapshot(schema, &snapshot);
                debug!(
                    observations = observations.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "serverinfo scrape succeeded"
                );
                (observations, 1.0)
            }
            Err(e) => {
                self.requests_ko.fetch_add(1, Ordering::Relaxed);
                warn!(
                    error = %e,
                    kind = e.kind(),
                    url = %self.client.url(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "serverinfo scrape failed"
                );
                (Vec::with_capacity(9), 0.0)
            }
        };

        out.push(Observation::unlabeled(&schema.result_ok, result_ok));
        out.push(Observation::new(
            &schema.requests,
            vec!["ok".to_string()],
            self.requests_ok() as f64,
        ));
        out.push(Observation::new(
            &schema.requests,
            vec!["ko".to_string()],
            self.requests_ko() as f64,
        ));
        if let Some(stats) = self.process.sample() {
            out.extend(map_process(schema, &stats));
        }
        out
    }

    /// Successful scrapes since start.
    pub fn requests_ok(&self) -> u64 {
        self.requests_ok.load(Ordering::Relaxed)
    }

    /// Failed scrapes since start.
    pub fn requests_ko(&self) -> u64 {
        self.requests_ko.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use nc_core::config::RawConfig;
    use nc_core::ExporterConfig;

    const FIXTURE: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/serverinfo/nextcloud-28.json"
    ));

    async fn spawn_upstream(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn test_config(addr: SocketAddr, timeout: f64) -> ExporterConfig {
        ExporterConfig::from_raw(RawConfig {
            nextcloud_url: format!("http://{addr}/info"),
            username: None,
            password: None,
            append_default_serverinfo_path: false,
            skip_apps: None,
            skip_update: None,
            timeout,
            listen: "127.0.0.1:0".to_string(),
        })
        .unwrap()
    }

    fn collector_for(config: &ExporterConfig) -> Collector {
        Collector::new(
            ServerInfoClient::new(config).unwrap(),
            Arc::new(Schema::new()),
        )
    }

    fn fixture_router() -> Router {
        Router::new().route(
            "/info",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], FIXTURE) }),
        )
    }

    /// Observations fed by the serverinfo document.
    fn data_count(obs: &[Observation<'_>]) -> usize {
        obs.iter()
            .filter(|o| {
                !o.name().starts_with("process_")
                    && !matches!(o.name(), "nextcloud_result_ok" | "nextcloud_requests")
            })
            .count()
    }

    fn value_of(obs: &[Observation<'_>], name: &str, label: Option<&str>) -> Option<f64> {
        obs.iter()
            .find(|o| {
                o.name() == name
                    && label.is_none_or(|l| o.label_values.first().map(String::as_str) == Some(l))
            })
            .map(|o| o.value)
    }

    #[tokio::test]
    async fn successful_scrape_emits_data() {
        let addr = spawn_upstream(fixture_router()).await;
        let collector = collector_for(&test_config(addr, 5.0));

        let obs = collector.collect().await;

        assert_eq!(value_of(&obs, "nextcloud_result_ok", None), Some(1.0));
        assert_eq!(value_of(&obs, "nextcloud_requests", Some("ok")), Some(1.0));
        assert_eq!(value_of(&obs, "nextcloud_requests", Some("ko")), Some(0.0));
        assert_eq!(value_of(&obs, "nextcloud_db_size_bytes", None), Some(104_857_600.0));
        assert_eq!(value_of(&obs, "nextcloud_num_apps", Some("installed")), Some(54.0));
        assert_eq!(value_of(&obs, "nextcloud_update", None), Some(0.0));
        assert_eq!(value_of(&obs, "nextcloud_shares_total", Some("link_password")), Some(36.0));
        assert_eq!(data_count(&obs), 23);
        assert!(value_of(&obs, "process_resident_memory_bytes", None).is_some());
        assert_eq!(collector.requests_ok(), 1);
        assert_eq!(collector.requests_ko(), 0);
    }

    #[tokio::test]
    async fn sends_accept_header() {
        let router = Router::new().route(
            "/info",
            get(|headers: HeaderMap| async move {
                match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
                    Some("application/json") => (StatusCode::OK, FIXTURE),
                    _ => (StatusCode::NOT_ACCEPTABLE, ""),
                }
            }),
        );
        let addr = spawn_upstream(router).await;
        let collector = collector_for(&test_config(addr, 5.0));

        let obs = collector.collect().await;
        assert_eq!(value_of(&obs, "nextcloud_result_ok", None), Some(1.0));
    }

    #[tokio::test]
    async fn sends_basic_auth_only_when_configured() {
        let router = Router::new().route(
            "/info",
            get(|headers: HeaderMap| async move {
                match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                    // base64("monitor:secret")
                    Some("Basic bW9uaXRvcjpzZWNyZXQ=") => (StatusCode::OK, FIXTURE),
                    _ => (StatusCode::UNAUTHORIZED, ""),
                }
            }),
        );
        let addr = spawn_upstream(router).await;

        let anonymous = collector_for(&test_config(addr, 5.0));
        anonymous.collect().await;
        assert_eq!(anonymous.requests_ko(), 1);

        let mut config = test_config(addr, 5.0);
        config.credentials = Some(nc_core::Credentials {
            username: "monitor".to_string(),
            password: "secret".to_string(),
        });
        let authed = collector_for(&config);
        authed.collect().await;
        assert_eq!(authed.requests_ok(), 1);
    }

    #[tokio::test]
    async fn non_200_status_fails_scrape() {
        let router = Router::new().route(
            "/info",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let addr = spawn_upstream(router).await;
        let collector = collector_for(&test_config(addr, 5.0));

        let obs = collector.collect().await;

        assert_eq!(data_count(&obs), 0);
        assert_eq!(value_of(&obs, "nextcloud_result_ok", None), Some(0.0));
        assert_eq!(value_of(&obs, "nextcloud_requests", Some("ko")), Some(1.0));
        assert_eq!(collector.requests_ko(), 1);

        for name in [
            "process_cpu_seconds_total",
            "process_resident_memory_bytes",
            "process_start_time_seconds",
        ] {
            assert!(value_of(&obs, name, None).is_some(), "{name} missing after failed scrape");
        }
    }

    #[tokio::test]
    async fn other_2xx_status_fails_scrape() {
        let router = Router::new().route("/info", get(|| async { (StatusCode::ACCEPTED, FIXTURE) }));
        let addr = spawn_upstream(router).await;
        let collector = collector_for(&test_config(addr, 5.0));

        collector.collect().await;
        assert_eq!(collector.requests_ko(), 1);
    }

    #[tokio::test]
    async fn decode_error_fails_scrape() {
        let router = Router::new().route(
            "/info",
            get(|| async { r#"{"ocs":{"data":{"nextcloud":{"system":{"debug":true}}}}}"# }),
        );
        let addr = spawn_upstream(router).await;
        let collector = collector_for(&test_config(addr, 5.0));

        let obs = collector.collect().await;
        assert_eq!(data_count(&obs), 0);
        assert_eq!(value_of(&obs, "nextcloud_result_ok", None), Some(0.0));
    }

    #[tokio::test]
    async fn client_decode_error_is_reported() {
        let router = Router::new().route("/info", get(|| async { "not json" }));
        let addr = spawn_upstream(router).await;
        let client = ServerInfoClient::new(&test_config(addr, 5.0)).unwrap();

        let err = client.fetch().await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn timeout_fails_scrape() {
        let router = Router::new().route(
            "/info",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                FIXTURE
            }),
        );
        let addr = spawn_upstream(router).await;
        let client = ServerInfoClient::new(&test_config(addr, 0.2)).unwrap();

        let err = client.fetch().await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[tokio::test]
    async fn connection_refused_fails_scrape() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let collector = collector_for(&test_config(addr, 2.0));
        let obs = collector.collect().await;
        assert_eq!(value_of(&obs, "nextcloud_result_ok", None), Some(0.0));
        assert_eq!(collector.requests_ko(), 1);
    }

    #[tokio::test]
    async fn counters_accumulate_across_concurrent_scrapes() {
        let addr = spawn_upstream(fixture_router()).await;
        let collector = Arc::new(collector_for(&test_config(addr, 5.0)));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let collector = Arc::clone(&collector);
            tasks.spawn(async move {
                let obs = collector.collect().await;
                value_of(&obs, "nextcloud_result_ok", None)
            });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap(), Some(1.0));
        }

        assert_eq!(collector.requests_ok(), 8);
        assert_eq!(collector.requests_ko(), 0);

        let obs = collector.collect().await;
        assert_eq!(value_of(&obs, "nextcloud_requests", Some("ok")), Some(9.0));
    }
}
