fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::FIBONACCI, &mut std::io::stdout().lock())?;
    Ok(())
}
