//! Metric descriptors and observations.
//!
//! A `Schema` is built once and shared; every `Observation` borrows the
//! descriptor it belongs to, so names, help text and label names are never
//! duplicated per scrape.

/// Prefix of every exported metric name.
pub const NAMESPACE: &str = "nextcloud";

/// Semantic type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Instantaneous value.
    Gauge,
    /// Monotonically increasing count.
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Immutable description of one metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDesc {
    /// Fully qualified name, namespace included.
    pub name: String,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    fn new(
        namespace: &str,
        name: &str,
        help: &'static str,
        kind: MetricKind,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name: format!("{namespace}_{name}"),
            help,
            kind,
            labels,
        }
    }

    fn gauge(namespace: &str, name: &str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self::new(namespace, name, help, MetricKind::Gauge, labels)
    }

    /// Process families keep the conventional unprefixed `process_` names.
    fn process(name: &str, help: &'static str, kind: MetricKind) -> Self {
        Self {
            name: format!("process_{name}"),
            help,
            kind,
            labels: &[],
        }
    }
}

/// Every metric family the exporter can emit.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub result_ok: MetricDesc,
    pub requests: MetricDesc,
    pub system_info: MetricDesc,
    pub num_apps: MetricDesc,
    pub update: MetricDesc,
    pub num_users: MetricDesc,
    pub num_files: MetricDesc,
    pub num_storages: MetricDesc,
    pub free_space: MetricDesc,
    pub shares: MetricDesc,
    pub fed_shares: MetricDesc,
    pub php_max_execution_time: MetricDesc,
    pub php_memory_limit: MetricDesc,
    pub php_upload_max_size: MetricDesc,
    pub db_size: MetricDesc,
    pub process_cpu_seconds: MetricDesc,
    pub process_resident_memory: MetricDesc,
    pub process_virtual_memory: MetricDesc,
    pub process_start_time: MetricDesc,
    pub process_open_fds: MetricDesc,
    pub process_max_fds: MetricDesc,
}

impl Schema {
    pub fn new() -> Self {
        Self::with_namespace(NAMESPACE)
    }

    pub fn with_namespace(ns: &str) -> Self {
        Self {
            result_ok: MetricDesc::gauge(ns, "result_ok", "1 if the last scrape is successful.", &[]),
            requests: MetricDesc::new(
                ns,
                "requests",
                "Counts the number of requests to the exporter",
                MetricKind::Counter,
                &["status"],
            ),
            system_info: MetricDesc::gauge(
                ns,
                "system_info",
                "Information about Nextcloud installation.",
                &["version", "php_version", "webserver", "database", "database_version"],
            ),
            num_apps: MetricDesc::gauge(
                ns,
                "num_apps",
                "Number applications installed and with update available.",
                &["status"],
            ),
            update: MetricDesc::gauge(ns, "update", "Update available.", &[]),
            num_users: MetricDesc::gauge(
                ns,
                "num_users_total",
                "Number of users on the instance.",
                &["status"],
            ),
            num_files: MetricDesc::gauge(
                ns,
                "num_files_total",
                "Number of files served by the instance.",
                &[],
            ),
            num_storages: MetricDesc::gauge(
                ns,
                "num_storages_total",
                "Number of storages served by the instance.",
                &["type"],
            ),
            free_space: MetricDesc::gauge(
                ns,
                "free_space_bytes",
                "Free space on the instance in bytes.",
                &[],
            ),
            shares: MetricDesc::gauge(ns, "shares_total", "Number of shares by type.", &["type"]),
            fed_shares: MetricDesc::gauge(
                ns,
                "fed_shares_total",
                "Number of federated shares by direction.",
                &["direction"],
            ),
            php_max_execution_time: MetricDesc::gauge(
                ns,
                "max_execution_time_seconds",
                "PHP max execution time in seconds.",
                &[],
            ),
            php_memory_limit: MetricDesc::gauge(
                ns,
                "php_memory_limit_bytes",
                "PHP memory limit in bytes.",
                &[],
            ),
            php_upload_max_size: MetricDesc::gauge(
                ns,
                "php_upload_max_size_bytes",
                "PHP maximum upload size in bytes.",
                &[],
            ),
            db_size: MetricDesc::gauge(ns, "db_size_bytes", "Database size in bytes.", &[]),
            process_cpu_seconds: MetricDesc::process(
                "cpu_seconds_total",
                "Total user and system CPU time spent in seconds.",
                MetricKind::Counter,
            ),
            process_resident_memory: MetricDesc::process(
                "resident_memory_bytes",
                "Resident memory size in bytes.",
                MetricKind::Gauge,
            ),
            process_virtual_memory: MetricDesc::process(
                "virtual_memory_bytes",
                "Virtual memory size in bytes.",
                MetricKind::Gauge,
            ),
            process_start_time: MetricDesc::process(
                "start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
                MetricKind::Gauge,
            ),
            process_open_fds: MetricDesc::process(
                "open_fds",
                "Number of open file descriptors.",
                MetricKind::Gauge,
            ),
            process_max_fds: MetricDesc::process(
                "max_fds",
                "Maximum number of open file descriptors.",
                MetricKind::Gauge,
            ),
        }
    }

    /// Families fed by the serverinfo snapshot, in emission order.
    pub fn data_metrics(&self) -> [&MetricDesc; 13] {
        [
            &self.system_info,
            &self.num_apps,
            &self.update,
            &self.num_users,
            &self.num_files,
            &self.num_storages,
            &self.free_space,
            &self.shares,
            &self.fed_shares,
            &self.php_max_execution_time,
            &self.php_memory_limit,
            &self.php_upload_max_size,
            &self.db_size,
        ]
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// One labeled data point produced during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<'a> {
    pub desc: &'a MetricDesc,
    /// Values in the same order as `desc.labels`.
    pub label_values: Vec<String>,
    pub value: f64,
}

impl<'a> Observation<'a> {
    pub fn new(desc: &'a MetricDesc, label_values: Vec<String>, value: f64) -> Self {
        debug_assert_eq!(
            desc.labels.len(),
            label_values.len(),
            "label arity mismatch for {}",
            desc.name
        );
        Self {
            desc,
            label_values,
            value,
        }
    }

    /// Observation for a family without labels.
    pub fn unlabeled(desc: &'a MetricDesc, value: f64) -> Self {
        Self::new(desc, Vec::new(), value)
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn kind(&self) -> MetricKind {
        self.desc.kind
    }

    /// (label name, label value) pairs.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.desc
            .labels
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}
