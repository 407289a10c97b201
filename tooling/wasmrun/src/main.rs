use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use wasmrun_host::{ConfigBuilder, Invocation, Returns, Runner, Value};

const ENV_MODULE: &str = "MODULE";
const ENV_FUEL: &str = "FUEL";
const ENV_DEBUG: &str = "DEBUG";

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum Interpret {
    Value,
    Bool,
    List,
}

impl From<Interpret> for Returns {
    fn from(interpret: Interpret) -> Self {
        match interpret {
            Interpret::Value => Returns::Value,
            Interpret::Bool => Returns::Bool,
            Interpret::List => Returns::List,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Call an export of a WebAssembly module", long_about = None)]
struct Args {
    /// Binary or text format module
    #[arg(env = ENV_MODULE)]
    module: PathBuf,

    /// Name of the exported function
    export: String,

    /// Arguments: 42, 42i64, 1.5, 1.5f32, true, [3,1,4]
    #[arg(allow_hyphen_values = true, num_args = 0..)]
    args: Vec<Value>,

    /// How the result is read
    #[arg(short, long, value_enum, default_value = "value")]
    returns: Interpret,

    /// Enable metering with the given amount of fuel
    #[arg(short, long, env = ENV_FUEL)]
    fuel: Option<u64>,

    #[arg(short, long, env = ENV_DEBUG, default_value_t = false)]
    debug: bool,
}

impl Args {
    fn invocation(&self) -> Invocation {
        Invocation::new(self.export.as_str())
            .args(self.args.iter().cloned())
            .returns(self.returns.into())
    }

    fn runner(&self) -> Runner {
        let mut cfg = ConfigBuilder::new();
        if let Some(fuel) = self.fuel {
            cfg = cfg.fuel(fuel);
        }
        Runner::new(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // logging
    let mut log_builder = env_logger::Builder::from_default_env();
    match args.debug {
        true => log_builder.filter_level(log::LevelFilter::Debug),
        false => log_builder.filter_level(log::LevelFilter::Info),
    }
    .init();

    let runner = args.runner();
    let invocation = args.invocation();

    let mut stdout = std::io::stdout().lock();
    let outcomes = runner.run(&args.module, std::slice::from_ref(&invocation), &mut stdout)?;

    for fuel in outcomes.iter().filter_map(|o| o.fuel_consumed) {
        writeln!(stdout, "fuel consumed: {}", fuel)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_call() {
        let args = Args::try_parse_from([
            "wasmrun",
            "pkg/add.wat",
            "add",
            "42",
            "-19",
        ])
        .unwrap();

        assert_eq!(args.module, PathBuf::from("pkg/add.wat"));
        assert_eq!(args.args, vec![Value::I32(42), Value::I32(-19)]);
        assert_eq!(args.returns, Interpret::Value);
        assert_eq!(args.invocation().display_label(), "add(42, -19)");
    }

    #[test]
    fn parse_list_and_options() {
        let args = Args::try_parse_from([
            "wasmrun",
            "--returns",
            "list",
            "--fuel",
            "5000",
            "pkg/reverse.wat",
            "reverse",
            "[3, 1, 4]",
        ])
        .unwrap();

        assert_eq!(args.args, vec![Value::List(vec![3, 1, 4])]);
        assert_eq!(args.fuel, Some(5000));
        assert_eq!(args.runner().config().fuel(), Some(5000));
        assert_eq!(Returns::from(args.returns), Returns::List);
    }

    #[test]
    fn rejects_bad_value() {
        let err = Args::try_parse_from(["wasmrun", "m.wasm", "f", "[1, 2"]);
        assert!(err.is_err());
    }
}
