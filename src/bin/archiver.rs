use logzip_bench::cli;
use logzip_bench::experiment::presets::ARCHIVER;

fn main() -> anyhow::Result<()> {
    cli::run(ARCHIVER)
}
