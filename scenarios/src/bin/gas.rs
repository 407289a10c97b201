/// How far the metered Fibonacci sequence is computed
const UPTO: i32 = 20;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    scenarios::gas(scenarios::GAS_LIMIT, UPTO, &mut std::io::stdout().lock())?;
    Ok(())
}
