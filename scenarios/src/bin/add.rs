fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::ADD, &mut std::io::stdout().lock())?;
    Ok(())
}
