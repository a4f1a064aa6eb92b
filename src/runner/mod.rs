use std::num::NonZeroUsize;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result};
use crate::metrics::MetricRecord;
use crate::probe::{file_size, SizeProbe};
use crate::timing::parse_timing;

pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Captured result of one child process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,     // None when killed by a signal
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a fully substituted command line to completion.
pub trait CommandExecutor {
    fn execute(&mut self, command: &str) -> Result<CommandOutput>;
}

/// Hands the command line to a shell (`<shell> -c <command>`), so `time -p`,
/// pipes and redirections inside templates behave as typed.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        ShellExecutor { shell: shell.into() }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        ShellExecutor::new(DEFAULT_SHELL)
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&mut self, command: &str) -> Result<CommandOutput> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|source| HarnessError::Spawn { shell: self.shell.clone(), source })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Compression,
    Decompression,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Compression => "compression",
            Direction::Decompression => "decompression",
        }
    }
}

/// Executes one command `run_times` times and folds the timings into a
/// [`MetricRecord`]. Trials run strictly one after another.
pub struct CommandRunner<E: CommandExecutor> {
    executor: E,
    run_times: NonZeroUsize,
}

impl<E: CommandExecutor> CommandRunner<E> {
    pub fn new(executor: E, run_times: NonZeroUsize) -> Self {
        CommandRunner { executor, run_times }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Compression trial set: accumulates timings and output sizes, then
    /// derives cost, speed and ratio.
    pub fn run_compress(
        &mut self,
        command: &str,
        record: &mut MetricRecord,
        original_path: &Path,
        probe: &SizeProbe,
    ) -> Result<()> {
        info!("CMD: {}", command);
        let mut compressed_size_sum = 0u64;

        let run_times = self.run_times.get();
        for i in 0..run_times {
            let timing = self.trial(command, i, Direction::Compression)?;
            record.real_time_sum += timing.real;
            record.user_time_sum += timing.user;
            record.sys_time_sum += timing.sys;

            compressed_size_sum += probe.measure()?;
            info!("No. {} compression command finished", i);
        }

        let original_size = file_size(original_path)?;
        record.finish_compression(run_times, compressed_size_sum, original_size)?;
        info!("{}", serde_json::Value::Object(record.fields()));

        Ok(())
    }

    /// Decompression trial set: timing only, the decompressed output is
    /// discarded by the command itself.
    pub fn run_decompress(&mut self, command: &str, record: &mut MetricRecord, original_path: &Path) -> Result<()> {
        info!("CMD: {}", command);

        let run_times = self.run_times.get();
        for i in 0..run_times {
            let timing = self.trial(command, i, Direction::Decompression)?;
            record.d_real_time_sum += timing.real;
            record.d_user_time_sum += timing.user;
            record.d_sys_time_sum += timing.sys;

            info!("No. {} decompression command finished", i);
        }

        let original_size = file_size(original_path)?;
        record.finish_decompression(run_times, original_size);
        info!("{}", serde_json::Value::Object(record.fields()));

        Ok(())
    }

    fn trial(&mut self, command: &str, index: usize, direction: Direction) -> Result<crate::timing::TrialTiming> {
        let output = self.executor.execute(command)?;
        debug!(trial = index, direction = direction.as_str(), "stderr:\n{}", output.stderr);

        // Exit status is not trusted either way; the timing report decides.
        if !output.success() {
            warn!(
                trial = index,
                direction = direction.as_str(),
                exit_code = ?output.exit_code,
                "command exited unsuccessfully: {}",
                command
            );
        }

        Ok(parse_timing(&output.stderr)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::tempdir;

    /// Replays canned stderr and records the commands it was given.
    struct Scripted {
        outputs: VecDeque<CommandOutput>,
        seen: Vec<String>,
    }

    impl Scripted {
        fn new(stderrs: &[&str]) -> Self {
            Scripted {
                outputs: stderrs
                    .iter()
                    .map(|s| CommandOutput { stderr: s.to_string(), exit_code: Some(0), ..Default::default() })
                    .collect(),
                seen: Vec::new(),
            }
        }
    }

    fn runs(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    impl CommandExecutor for Scripted {
        fn execute(&mut self, command: &str) -> Result<CommandOutput> {
            self.seen.push(command.to_string());
            Ok(self.outputs.pop_front().expect("more trials than scripted outputs"))
        }
    }

    #[test]
    fn test_compress_accumulates_all_trials() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("Log.txt");
        let compressed = dir.path().join("Log.txt.gz");
        fs::write(&original, vec![b'a'; 1000]).unwrap();
        fs::write(&compressed, vec![0u8; 250]).unwrap();

        let executor = Scripted::new(&[
            "real 1.0\nuser 0.5\nsys 0.1\n",
            "real 3.0\nuser 0.7\nsys 0.1\n",
        ]);
        let mut runner = CommandRunner::new(executor, runs(2));
        let mut record = MetricRecord::new("gzip");

        runner
            .run_compress("gzip", &mut record, &original, &SizeProbe::File(compressed))
            .unwrap();

        assert_eq!(runner.executor().seen, vec!["gzip", "gzip"]);
        assert!((record.real_time_sum - 4.0).abs() < 1e-12);
        assert!((record.cost_time - 0.7).abs() < 1e-12);
        assert_eq!(record.original_size, 1000);
        assert_eq!(record.compressed_size, 250.0);
        assert_eq!(record.ratio, 4.0);
    }

    #[test]
    fn test_decompress_leaves_compression_fields() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("Log.txt");
        fs::write(&original, vec![b'a'; 512]).unwrap();

        let mut runner = CommandRunner::new(Scripted::new(&["real 0.5\nuser 0.25\nsys 0.25\n"]), runs(1));
        let mut record = MetricRecord::new("bzip2");
        runner.run_decompress("bzip2 -d", &mut record, &original).unwrap();

        assert_eq!(record.d_cost_time, 0.5);
        assert_eq!(record.d_speed, 1024.0);
        assert_eq!(record.cost_time, 0.0);
        assert_eq!(record.compressed_size, 0.0);
    }

    #[test]
    fn test_failed_exit_status_is_not_fatal() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("Log.txt");
        fs::write(&original, b"abcd").unwrap();

        let mut executor = Scripted::new(&[]);
        executor.outputs.push_back(CommandOutput {
            stderr: "7za: not found\nreal 0.00\nuser 0.00\nsys 0.00\n".to_string(),
            exit_code: Some(127),
            ..Default::default()
        });
        let mut runner = CommandRunner::new(executor, runs(1));
        let mut record = MetricRecord::new("LZMA");

        runner.run_decompress("7za x", &mut record, &original).unwrap();
        assert_eq!(record.d_speed, 0.0);
    }

    #[test]
    fn test_shell_executor_captures_stderr() {
        let mut shell = ShellExecutor::default();
        let output = shell.execute("echo out; printf 'real 1.5\\nuser 0.5\\nsys 0.25\\n' >&2; exit 3").unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(parse_timing(&output.stderr).unwrap().sys, 0.25);
    }

    #[test]
    fn test_missing_shell_is_spawn_error() {
        let mut shell = ShellExecutor::new("/nonexistent/shell");
        assert!(matches!(shell.execute("true"), Err(HarnessError::Spawn { .. })));
    }
}
