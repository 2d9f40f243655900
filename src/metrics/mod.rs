pub mod exporter;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use traits::{MetricsExporter, MetricsSnapshotProvider};
