fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::SQUARE, &mut std::io::stdout().lock())?;
    Ok(())
}
