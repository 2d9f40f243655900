use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::traits::MetricsExporter;
use crate::stats::CacheStats;

/// Prometheus text exporter for [`CacheStats`].
///
/// Writes the text exposition format so the output can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector. Write errors are
/// dropped; an exporter never fails the cache.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_metric(writer: &mut W, kind: &str, name: &str, value: impl std::fmt::Display) {
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        let _ = writeln!(writer, "{name} {value}");
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<CacheStats> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheStats) {
        let mut writer = self.writer.lock();
        let counters = [
            ("requests_total", snapshot.requests),
            ("hits_total", snapshot.hits),
            ("misses_total", snapshot.misses()),
            ("loads_total", snapshot.load_count),
            ("load_failures_total", snapshot.load_failures),
            ("evictions_total", snapshot.evictions),
        ];
        for (suffix, value) in counters {
            Self::write_metric(&mut writer, "counter", &self.metric_name(suffix), value);
        }
        Self::write_metric(
            &mut writer,
            "gauge",
            &self.metric_name("hit_rate"),
            snapshot.hit_rate(),
        );
        Self::write_metric(
            &mut writer,
            "gauge",
            &self.metric_name("average_load_penalty_seconds"),
            snapshot.average_load_penalty.as_secs_f64(),
        );
    }
}
