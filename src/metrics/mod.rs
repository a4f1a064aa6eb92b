use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HarnessError, Result};

/// Measurements for one (dataset, method) cell.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub original_size: u64,         // Size of the input log in bytes
    pub compressed_size: f64,       // Mean output size across trials

    pub user_time_sum: f64,
    pub sys_time_sum: f64,
    pub real_time_sum: f64,
    pub cost_time: f64,             // Mean user + sys seconds per trial
    pub speed: f64,                 // Bytes per second of CPU time
    pub ratio: f64,

    pub d_user_time_sum: f64,
    pub d_sys_time_sum: f64,
    pub d_real_time_sum: f64,
    pub d_cost_time: f64,
    pub d_speed: f64,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>) -> Self {
        MetricRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Computes the compression-side derived fields once every trial has been
    /// accumulated. Wall time is left out of the cost on purpose: it is
    /// dominated by page cache effects.
    pub fn finish_compression(&mut self, run_times: usize, compressed_size_sum: u64, original_size: u64) -> Result<()> {
        let runs = run_times as f64;
        self.cost_time = (self.user_time_sum + self.sys_time_sum) / runs;
        self.compressed_size = compressed_size_sum as f64 / runs;
        self.original_size = original_size;
        self.speed = throughput(original_size, self.cost_time);

        if self.compressed_size == 0.0 {
            return Err(HarnessError::ZeroCompressedSize { name: self.name.clone() });
        }
        self.ratio = original_size as f64 / self.compressed_size;

        Ok(())
    }

    pub fn finish_decompression(&mut self, run_times: usize, original_size: u64) {
        self.d_cost_time = (self.d_user_time_sum + self.d_sys_time_sum) / run_times as f64;
        self.original_size = original_size;
        self.d_speed = throughput(original_size, self.d_cost_time);
    }

    /// Flat field name -> value mapping, used for diagnostic logging.
    pub fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

// A zero-cost run reports zero throughput, not infinity.
fn throughput(bytes: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}

/// All records measured for one dataset, in column order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetResultRow {
    pub dataset_name: String,
    pub results: Vec<MetricRecord>,
}

impl DatasetResultRow {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        DatasetResultRow {
            dataset_name: dataset_name.into(),
            results: Vec::new(),
        }
    }
}

/// Dataset x method grid produced by one experiment run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultGrid {
    pub experiment: String,
    pub columns: Vec<String>,       // Report labels, one per method/variant
    pub rows: Vec<DatasetResultRow>,
}

impl ResultGrid {
    pub fn new(experiment: impl Into<String>, columns: Vec<String>) -> Self {
        ResultGrid {
            experiment: experiment.into(),
            columns,
            rows: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_times(user: f64, sys: f64) -> MetricRecord {
        let mut record = MetricRecord::new("gzip");
        record.user_time_sum = user;
        record.sys_time_sum = sys;
        record
    }

    #[test]
    fn test_cost_time_is_mean_cpu_time() {
        let mut record = record_with_times(1.2, 0.2);
        record.real_time_sum = 9.0;
        record.finish_compression(2, 420, 1000).unwrap();

        assert!((record.cost_time - 0.7).abs() < 1e-12);
        assert_eq!(record.compressed_size, 210.0);
        assert!((record.ratio - 1000.0 / 210.0).abs() < 1e-12);
        assert!((record.speed - 1000.0 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cost_reports_zero_speed() {
        let mut record = record_with_times(0.0, 0.0);
        record.finish_compression(3, 30, 100).unwrap();
        assert_eq!(record.speed, 0.0);

        record.finish_decompression(3, 100);
        assert_eq!(record.d_speed, 0.0);
    }

    #[test]
    fn test_zero_compressed_size_fails() {
        let mut record = record_with_times(0.5, 0.1);
        let err = record.finish_compression(1, 0, 100).unwrap_err();
        assert!(matches!(err, HarnessError::ZeroCompressedSize { ref name } if name == "gzip"));
    }

    #[test]
    fn test_decompression_fields_are_separate() {
        let mut record = record_with_times(0.3, 0.1);
        record.d_user_time_sum = 0.2;
        record.d_sys_time_sum = 0.2;
        record.finish_decompression(2, 800);

        assert!((record.d_cost_time - 0.2).abs() < 1e-12);
        assert!((record.d_speed - 4000.0).abs() < 1e-9);
        assert_eq!(record.cost_time, 0.0);
    }

    #[test]
    fn test_fields_are_flat() {
        let record = MetricRecord::new("bzip2");
        let fields = record.fields();
        assert_eq!(fields["name"], Value::from("bzip2"));
        assert!(fields.contains_key("d_speed"));
        assert!(fields.values().all(|v| !v.is_object() && !v.is_array()));
    }
}
