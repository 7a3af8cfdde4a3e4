use anyhow::Context as _;
use episim::{population_loader, run_with_args};

fn main() -> anyhow::Result<()> {
    run_with_args(|context, _| {
        population_loader::init(context);
        Ok(())
    })
    .context("simulation failed")?;
    Ok(())
}
