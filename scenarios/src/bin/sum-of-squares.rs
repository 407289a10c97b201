fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::SUM_OF_SQUARES, &mut std::io::stdout().lock())?;
    Ok(())
}
