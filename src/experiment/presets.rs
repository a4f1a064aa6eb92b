//! The experiments of the DNSLogzip evaluation.
//!
//! Prerequisites on the benchmark host: gzip 1.12, bzip2 1.0.8, 7za 16.02,
//! and `DNSLogzip` / `Archiver` on `PATH`.

use super::{Experiment, Variant};
use crate::template::TemplateError;

/// Compressed artefacts live in the scratch directory, one per cell.
pub const COMPRESSED_PATH: &str = "{scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}";

pub const Q1: &str = "Q1";
pub const Q2Q3: &str = "Q2Q3";
pub const ARCHIVER: &str = "Archiver";

pub const NAMES: [&str; 3] = [Q1, Q2Q3, ARCHIVER];

pub fn by_name(name: &str) -> Option<Result<Experiment, TemplateError>> {
    match name {
        Q1 => Some(q1()),
        Q2Q3 => Some(q2q3()),
        ARCHIVER => Some(archiver()),
        _ => None,
    }
}

/// Compression ratio and speed of DNSLogzip followed by a general-purpose
/// compressor, against the general-purpose compressors alone.
pub fn q1() -> Result<Experiment, TemplateError> {
    let variants = vec![
        Variant::new(
            "DNSLogzip(gzip)", "DNSLogzip", "dlz.gz",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( DNSLogzip < {data_dir}/{dataset}/{log_file} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; gzip < {scratch_dir}/{experiment}.{dataset}.{result}.txt > {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt",
        )?
        .with_decompress(
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt && time -p ( gzip -c -d {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; DNSLogzip -D < {scratch_dir}/{experiment}.{dataset}.{result}.txt > /dev/null ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
        Variant::new(
            "DNSLogzip(bzip2)", "DNSLogzip", "dlz.bz2",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( DNSLogzip < {data_dir}/{dataset}/{log_file} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; bzip2 < {scratch_dir}/{experiment}.{dataset}.{result}.txt > {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt",
        )?
        .with_decompress(
            "time -p ( bzip2 -d < {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; DNSLogzip -D < {scratch_dir}/{experiment}.{dataset}.{result}.txt > /dev/null ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
        Variant::new(
            "DNSLogzip(lzma)", "DNSLogzip", "dlz.7z",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( DNSLogzip < {data_dir}/{dataset}/{log_file} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; 7za a -si {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} < {scratch_dir}/{experiment}.{dataset}.{result}.txt ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt",
        )?
        .with_decompress(
            "time -p ( 7za x -so {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; DNSLogzip -D < {scratch_dir}/{experiment}.{dataset}.{result}.txt > /dev/null ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
        Variant::new(
            "gzip", "gzip", "gz",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( gzip > {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} < {data_dir}/{dataset}/{log_file} )",
        )?
        .with_decompress(
            "time -p ( gzip -c -d {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > /dev/null ) ; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
        Variant::new(
            "bzip2", "bzip2", "bz2",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( bzip2 > {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} < {data_dir}/{dataset}/{log_file} )",
        )?
        .with_decompress(
            "time -p ( bzip2 -d > /dev/null < {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} ); rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
        Variant::new(
            "lzma", "LZMA", "7z",
            "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( 7za a -si {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} < {data_dir}/{dataset}/{log_file} )",
        )?
        .with_decompress(
            "time -p ( 7za x -so {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > /dev/null ) ; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}",
        )?,
    ];

    Experiment::new(Q1, COMPRESSED_PATH, variants)
}

const SWEEP_COMPRESS: &str = "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} && time -p ( DNSLogzip -{param} < {data_dir}/{dataset}/{log_file} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; gzip < {scratch_dir}/{experiment}.{dataset}.{result}.txt > {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt";

const SWEEP_DECOMPRESS: &str = "rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt && time -p ( gzip -c -d {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix} > {scratch_dir}/{experiment}.{dataset}.{result}.txt ; DNSLogzip -{param} -D < {scratch_dir}/{experiment}.{dataset}.{result}.txt > /dev/null ) && rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt; rm -rf {scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}";

/// (param token, column label) pairs of the Q2/Q3 sweep: function mask,
/// encoding table size exponent, and line sorting buffer length.
pub fn q2q3_params() -> Vec<(String, String)> {
    let masks = [
        ("M0x0", "No techniques"),
        ("M0x03", "+ Data Transformer"),
        ("M0x7F", "+ Data Reducer"),
    ]
    .into_iter()
    .map(|(p, l)| (p.to_string(), l.to_string()));
    let exponents = (16..=52).step_by(4).map(|e| (format!("E{}", e), format!("E={}", e)));
    let lengths = (10_000..=55_000).step_by(5_000).map(|l| (format!("L{}", l), format!("L={}", l)));

    masks.chain(exponents).chain(lengths).collect()
}

/// DNSLogzip + gzip across one tunable at a time.
pub fn q2q3() -> Result<Experiment, TemplateError> {
    let variants = q2q3_params()
        .into_iter()
        .map(|(param, label)| -> Result<Variant, TemplateError> {
            Ok(Variant::new(&label, &param, "dlz.gz", SWEEP_COMPRESS)?
                .with_decompress(SWEEP_DECOMPRESS)?
                .with_param(&param))
        })
        .collect::<Result<Vec<_>, TemplateError>>()?;

    Experiment::new(Q2Q3, COMPRESSED_PATH, variants)
}

/// The log-archive variant writes a directory of segments instead of a file,
/// so its size is the sum over that directory. Compression only.
pub fn archiver() -> Result<Experiment, TemplateError> {
    let variants = vec![Variant::new(
        "LogArchive", "LogArchive", "none",
        "mkdir -p {scratch_dir}/Archiver && cd {scratch_dir}/Archiver && rm -rf * && time -p ( Archiver < {data_dir}/{dataset}/{log_file} 2>/dev/null )",
    )?
    .measure_directory("{scratch_dir}/Archiver")?];

    Experiment::new(ARCHIVER, COMPRESSED_PATH, variants)
}
