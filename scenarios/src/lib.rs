use std::io::Write;
use wasmrun_host::{ConfigBuilder, Invocation, Outcome, Returns, Runner, Separator};

macro_rules! pkg {
    ($file:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/pkg/", $file)
    };
}

/// A module paired with the calls made against it.
pub struct Scenario {
    pub name: &'static str,
    pub module: &'static str,
    pub invocations: fn() -> Vec<Invocation>,
}

impl Scenario {
    pub fn invocations(&self) -> Vec<Invocation> {
        (self.invocations)()
    }
}

pub const ADD: Scenario = Scenario {
    name: "add",
    module: pkg!("add.wat"),
    invocations: || {
        vec![
            Invocation::new("add")
                .args([42, 19])
                .label("42 + 19")
                .separator(Separator::EqEq),
            Invocation::new("add").args([1, 2]).label("1 + 2"),
        ]
    },
};

pub const PYTHAG: Scenario = Scenario {
    name: "pythag",
    module: pkg!("pythag.wat"),
    invocations: || {
        [[1, 2, 3], [3, 4, 5]]
            .into_iter()
            .map(|[a, b, c]| {
                Invocation::new("is_pythag")
                    .args([a, b, c])
                    .returns(Returns::Bool)
                    .label(format!("isPythag({a}, {b}, {c})"))
                    .separator(Separator::EqEq)
            })
            .collect()
    },
};

pub const SQUARE: Scenario = Scenario {
    name: "square",
    module: pkg!("square.wat"),
    invocations: || vec![Invocation::new("square").arg(4)],
};

pub const FIBONACCI: Scenario = Scenario {
    name: "fibonacci",
    module: pkg!("fibonacci.wat"),
    invocations: || {
        vec![
            Invocation::new("fibrec").arg(10),
            Invocation::new("fibiter").arg(10),
        ]
    },
};

pub const REVERSE: Scenario = Scenario {
    name: "reverse",
    module: pkg!("reverse.wat"),
    invocations: || {
        vec![
            Invocation::new("reverse")
                .arg(vec![3, 1, 4, 1, 5, 9, 2, 6])
                .returns(Returns::List)
                .separator(Separator::EqEq),
        ]
    },
};

pub const SUM_OF_SQUARES: Scenario = Scenario {
    name: "sum-of-squares",
    module: pkg!("sum_of_squares.wat"),
    invocations: || vec![Invocation::new("sum_of_squares").arg(100)],
};

pub const ALL: &[&Scenario] = &[&ADD, &PYTHAG, &SQUARE, &FIBONACCI, &REVERSE, &SUM_OF_SQUARES];

pub fn run<W: Write>(scenario: &Scenario, out: &mut W) -> wasmrun_host::Result<Vec<Outcome>> {
    log::info!("running scenario '{}'", scenario.name);
    Runner::default().run(scenario.module, &scenario.invocations(), out)
}

/// Fuel granted to every metered call
pub const GAS_LIMIT: u64 = 1_000_000;

/// Metered `fibrec` for `1..=upto`, printing the fuel each call consumed.
pub fn gas<W: Write>(limit: u64, upto: i32, out: &mut W) -> wasmrun_host::Result<Vec<Outcome>> {
    let runner = Runner::new(ConfigBuilder::new().fuel(limit));
    let buffer = runner.load(FIBONACCI.module)?;
    let compiled = runner.compile(&buffer)?;
    let mut instance = runner.instantiate(&compiled)?;

    let mut outcomes = Vec::new();
    for n in 1..=upto {
        let outcome = runner.invoke(&mut instance, &Invocation::new("fibrec").arg(n))?;
        let value = outcome
            .value
            .as_ref()
            .map_or_else(|| "()".to_string(), |v| v.to_string());
        // metering is always on here
        let fuel = outcome.fuel_consumed.unwrap_or_default();
        writeln!(out, "consumed {} to compute fib({}) = {}", fuel, n, value)?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
