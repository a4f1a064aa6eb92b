use prettytable::{row, Table};
use std::fs;
use std::path::Path;

use crate::error::{HarnessError, Result};
use crate::metrics::{DatasetResultRow, ResultGrid};

pub const DATASET_COLUMN: &str = "DatasetName";
pub const RATIO_SUFFIX: &str = "(CR)";
pub const COMPRESSION_SPEED_SUFFIX: &str = "(CS)";
pub const DECOMPRESSION_SPEED_SUFFIX: &str = "(DS)";

const MIB: f64 = 1024.0 * 1024.0;

/// Bytes per second to MiB per second.
pub fn to_mib(bytes_per_second: f64) -> f64 {
    bytes_per_second / 1024.0 / 1024.0
}

pub fn header(columns: &[String]) -> Vec<String> {
    let mut fields = Vec::with_capacity(1 + columns.len() * 3);
    fields.push(DATASET_COLUMN.to_string());
    for label in columns {
        fields.push(format!("{}{}", label, RATIO_SUFFIX));
        fields.push(format!("{}{}", label, COMPRESSION_SPEED_SUFFIX));
        fields.push(format!("{}{}", label, DECOMPRESSION_SPEED_SUFFIX));
    }
    fields
}

pub fn data_row(row: &DatasetResultRow) -> Vec<String> {
    let mut fields = Vec::with_capacity(1 + row.results.len() * 3);
    fields.push(row.dataset_name.clone());
    for result in &row.results {
        fields.push(format!("{:.2}", result.ratio));
        fields.push(format!("{:.2}", to_mib(result.speed)));
        fields.push(format!("{:.2}", to_mib(result.d_speed)));
    }
    fields
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| HarnessError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Writes the comparison report, truncating any previous file at `path`.
pub fn write_csv(grid: &ResultGrid, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(header(&grid.columns))?;
    for row in &grid.rows {
        writer.write_record(data_row(row))?;
    }
    writer.flush().map_err(|e| HarnessError::io(path, e))?;

    Ok(())
}

/// Full-precision dump of the grid, every record field included.
pub fn write_json(grid: &ResultGrid, path: &Path) -> Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(grid)?;
    fs::write(path, json).map_err(|e| HarnessError::io(path, e))
}

/// Prints one table per dataset.
pub fn print_summary(grid: &ResultGrid) {
    for row in &grid.rows {
        let mut table = Table::new();
        table.add_row(row![
            "Method",
            "Comp Rate",
            "Comp Speed (MiB/s)",
            "Decomp Speed (MiB/s)",
            "Cost (s)",
            "Decomp Cost (s)",
            "Size (MiB)"
        ]);

        for (label, result) in grid.columns.iter().zip(&row.results) {
            table.add_row(row![
                label,
                format!("{:.3}", result.ratio),
                format!("{:.2}", to_mib(result.speed)),
                format!("{:.2}", to_mib(result.d_speed)),
                format!("{:.3}", result.cost_time),
                format!("{:.3}", result.d_cost_time),
                format!("{:.2}", result.compressed_size / MIB),
            ]);
        }

        println!("\nResults for {} on dataset: {}", grid.experiment, row.dataset_name);
        table.printstd();
    }
}
