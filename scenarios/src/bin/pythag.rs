fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::run(&scenarios::PYTHAG, &mut std::io::stdout().lock())?;
    Ok(())
}
