fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::REVERSE, &mut std::io::stdout().lock())?;
    Ok(())
}
