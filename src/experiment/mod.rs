pub mod presets;

use crate::template::{self, CommandTemplate, TemplateError};

/// Placeholders every cell supplies. `param` is added for parameter sweeps.
pub const CELL_PLACEHOLDERS: [&str; 8] = [
    template::EXPERIMENT,
    template::WORKING_DIR,
    template::DATASET,
    template::RESULT,
    template::LOG_FILE,
    template::SUFFIX,
    template::SCRATCH_DIR,
    template::DATA_DIR,
];

/// Where the compressed output of a variant lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeStrategy {
    /// The single file named by the experiment's compressed-path template.
    OutputFile,
    /// A directory tree whose files are summed.
    Directory(CommandTemplate),
}

/// One method (or one parameter value of a sweep) under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub label: String,              // Report column label
    pub result_name: String,        // Record name and `{result}` value
    pub suffix: String,
    pub param: Option<String>,
    pub compress: CommandTemplate,
    pub decompress: Option<CommandTemplate>,
    pub size: SizeStrategy,
}

impl Variant {
    pub fn new(label: &str, result_name: &str, suffix: &str, compress: &str) -> Result<Self, TemplateError> {
        Ok(Variant {
            label: label.to_string(),
            result_name: result_name.to_string(),
            suffix: suffix.to_string(),
            param: None,
            compress: CommandTemplate::parse(compress)?,
            decompress: None,
            size: SizeStrategy::OutputFile,
        })
    }

    pub fn with_decompress(mut self, decompress: &str) -> Result<Self, TemplateError> {
        self.decompress = Some(CommandTemplate::parse(decompress)?);
        Ok(self)
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    pub fn measure_directory(mut self, dir: &str) -> Result<Self, TemplateError> {
        self.size = SizeStrategy::Directory(CommandTemplate::parse(dir)?);
        Ok(self)
    }

    fn templates(&self) -> impl Iterator<Item = &CommandTemplate> {
        let dir = match &self.size {
            SizeStrategy::Directory(t) => Some(t),
            SizeStrategy::OutputFile => None,
        };
        std::iter::once(&self.compress).chain(self.decompress.as_ref()).chain(dir)
    }
}

/// A dataset x variant sweep. Both the method comparison and the parameter
/// sweep experiments are expressed as one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    name: String,
    compressed_path: CommandTemplate,
    variants: Vec<Variant>,
}

impl Experiment {
    /// Checks every template against the placeholders its cells will supply.
    pub fn new(name: &str, compressed_path: &str, variants: Vec<Variant>) -> Result<Self, TemplateError> {
        let compressed_path = CommandTemplate::parse(compressed_path)?;
        compressed_path.check(CELL_PLACEHOLDERS)?;

        for variant in &variants {
            let param = variant.param.as_ref().map(|_| template::PARAM);
            for t in variant.templates() {
                t.check(CELL_PLACEHOLDERS.into_iter().chain(param))?;
            }
        }

        Ok(Experiment { name: name.to_string(), compressed_path, variants })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compressed_path(&self) -> &CommandTemplate {
        &self.compressed_path
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn labels(&self) -> Vec<String> {
        self.variants.iter().map(|v| v.label.clone()).collect()
    }

    pub fn report_file_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    /// True when every variant also benchmarks decompression.
    pub fn round_trip(&self) -> bool {
        !self.variants.is_empty() && self.variants.iter().all(|v| v.decompress.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "{scratch_dir}/{experiment}.{dataset}.{result}.txt.{suffix}";

    #[test]
    fn test_param_only_allowed_on_sweeps() {
        let plain = Variant::new("gzip", "gzip", "gz", "gzip -{param}").unwrap();
        let err = Experiment::new("X", PATH, vec![plain.clone()]).unwrap_err();
        assert!(matches!(err, TemplateError::MissingValue { ref placeholder, .. } if placeholder == "param"));

        let swept = plain.with_param("9");
        assert!(Experiment::new("X", PATH, vec![swept]).is_ok());
    }

    #[test]
    fn test_unknown_placeholder_in_decompress() {
        let variant = Variant::new("gzip", "gzip", "gz", "gzip")
            .unwrap()
            .with_decompress("gzip -d {workdir}")
            .unwrap();
        assert!(Experiment::new("X", PATH, vec![variant]).is_err());
    }

    #[test]
    fn test_unknown_placeholder_in_output_dir() {
        let variant = Variant::new("LogArchive", "LogArchive", "none", "Archiver")
            .unwrap()
            .measure_directory("{ramdisk}/Archiver")
            .unwrap();
        assert!(Experiment::new("X", PATH, vec![variant]).is_err());
    }

    #[test]
    fn test_round_trip() {
        let one_way = Variant::new("a", "a", "x", "true").unwrap();
        let both = one_way.clone().with_decompress("true").unwrap();

        assert!(Experiment::new("X", PATH, vec![both.clone()]).unwrap().round_trip());
        assert!(!Experiment::new("X", PATH, vec![both, one_way]).unwrap().round_trip());
        assert!(!Experiment::new("X", PATH, vec![]).unwrap().round_trip());
    }
}
