use logzip_bench::cli;
use logzip_bench::experiment::presets::Q1;

fn main() -> anyhow::Result<()> {
    cli::run(Q1)
}
