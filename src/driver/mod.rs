use std::path::PathBuf;
use tracing::info;

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::experiment::{Experiment, SizeStrategy, Variant};
use crate::metrics::{DatasetResultRow, MetricRecord, ResultGrid};
use crate::probe::SizeProbe;
use crate::runner::{CommandExecutor, CommandRunner};
use crate::template::{self, Substitutions};

/// Runs every (dataset, variant) cell of an experiment in declaration order
/// and collects the records into a [`ResultGrid`].
pub struct GridDriver<'a, E: CommandExecutor> {
    config: &'a HarnessConfig,
    experiment: &'a Experiment,
    runner: CommandRunner<E>,
}

impl<'a, E: CommandExecutor> GridDriver<'a, E> {
    pub fn new(config: &'a HarnessConfig, experiment: &'a Experiment, executor: E) -> Self {
        GridDriver {
            config,
            experiment,
            runner: CommandRunner::new(executor, config.run_times()),
        }
    }

    pub fn runner(&self) -> &CommandRunner<E> {
        &self.runner
    }

    /// The grid is only returned once every cell has completed; the first
    /// failing cell aborts the whole run.
    pub fn run(&mut self) -> Result<ResultGrid> {
        let (config, experiment) = (self.config, self.experiment);
        let mut grid = ResultGrid::new(experiment.name(), experiment.labels());
        let datasets = config.datasets();

        for (i, dataset) in datasets.iter().enumerate() {
            info!("({}/{}) Running {} on dataset {}", i + 1, datasets.len(), experiment.name(), dataset);

            let mut row = DatasetResultRow::new(dataset.as_str());
            for variant in experiment.variants() {
                row.results.push(self.run_cell(dataset, variant)?);
            }
            grid.rows.push(row);
        }

        Ok(grid)
    }

    fn run_cell(&mut self, dataset: &str, variant: &Variant) -> Result<MetricRecord> {
        let mut record = MetricRecord::new(variant.result_name.as_str());
        let values = self.substitutions(dataset, variant);

        let original_path = self.config.original_file_path(dataset);
        let compressed_path = PathBuf::from(self.experiment.compressed_path().render(&values)?);
        let probe = match &variant.size {
            SizeStrategy::OutputFile => SizeProbe::File(compressed_path),
            SizeStrategy::Directory(dir) => SizeProbe::Directory(PathBuf::from(dir.render(&values)?)),
        };

        let command = variant.compress.render(&values)?;
        self.runner.run_compress(&command, &mut record, &original_path, &probe)?;

        if let Some(decompress) = &variant.decompress {
            let command = decompress.render(&values)?;
            self.runner.run_decompress(&command, &mut record, &original_path)?;
        }

        Ok(record)
    }

    fn substitutions(&self, dataset: &str, variant: &Variant) -> Substitutions {
        let values = Substitutions::new()
            .with(template::EXPERIMENT, self.experiment.name())
            .with(template::WORKING_DIR, self.config.working_dir().to_string_lossy())
            .with(template::DATASET, dataset)
            .with(template::RESULT, variant.result_name.as_str())
            .with(template::LOG_FILE, self.config.log_file_name())
            .with(template::SUFFIX, variant.suffix.as_str())
            .with(template::SCRATCH_DIR, self.config.scratch_dir().to_string_lossy())
            .with(template::DATA_DIR, self.config.data_dir().to_string_lossy());

        match &variant.param {
            Some(param) => values.with(template::PARAM, param.as_str()),
            None => values,
        }
    }
}
