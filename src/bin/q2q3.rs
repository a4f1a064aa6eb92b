use logzip_bench::cli;
use logzip_bench::experiment::presets::Q2Q3;

fn main() -> anyhow::Result<()> {
    cli::run(Q2Q3)
}
