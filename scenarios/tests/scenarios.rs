use scenarios::{ADD, ALL, FIBONACCI, PYTHAG, REVERSE, SQUARE, SUM_OF_SQUARES, Scenario};
use wasmrun_host::{Error, Invocation, InvocationError, Runner, Value};

fn output(scenario: &Scenario) -> String {
    let mut out = Vec::new();
    scenarios::run(scenario, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn add() {
    assert_eq!(output(&ADD), "42 + 19 == 61\n1 + 2 = 3\n");
}

#[test]
fn pythag() {
    assert_eq!(
        output(&PYTHAG),
        "isPythag(1, 2, 3) == false\nisPythag(3, 4, 5) == true\n"
    );
}

#[test]
fn square() {
    assert_eq!(output(&SQUARE), "square(4) = 16\n");
}

#[test]
fn fibonacci() {
    assert_eq!(output(&FIBONACCI), "fibrec(10) = 55\nfibiter(10) = 55\n");
}

#[test]
fn fibonacci_variants_agree() {
    let runner = Runner::default();
    let buffer = runner.load(FIBONACCI.module).unwrap();
    let compiled = runner.compile(&buffer).unwrap();
    let mut instance = runner.instantiate(&compiled).unwrap();

    for n in 1..=20 {
        let rec = instance.invoke(&Invocation::new("fibrec").arg(n)).unwrap();
        let iter = instance.invoke(&Invocation::new("fibiter").arg(n)).unwrap();
        assert_eq!(rec.value, iter.value, "fib({n})");
    }
}

#[test]
fn reverse() {
    assert_eq!(
        output(&REVERSE),
        "reverse([3, 1, 4, 1, 5, 9, 2, 6]) == [6, 2, 9, 5, 1, 4, 1, 3]\n"
    );
}

#[test]
fn reverse_large_list_grows_memory() {
    let items = (0..40_000).collect::<Vec<i32>>();
    let mut expected = items.clone();
    expected.reverse();

    let runner = Runner::default();
    let buffer = runner.load(REVERSE.module).unwrap();
    let compiled = runner.compile(&buffer).unwrap();
    let mut instance = runner.instantiate(&compiled).unwrap();

    let outcome = instance
        .invoke(
            &Invocation::new("reverse")
                .arg(items)
                .returns(wasmrun_host::Returns::List),
        )
        .unwrap();
    assert_eq!(outcome.value, Some(Value::List(expected)));
}

#[test]
fn sum_of_squares() {
    assert_eq!(output(&SUM_OF_SQUARES), "sum_of_squares(100) = 338350\n");
}

#[test]
fn modules_are_shipped() {
    for scenario in ALL {
        assert!(
            std::path::Path::new(scenario.module).is_file(),
            "{} is missing its module",
            scenario.name
        );
    }
}

#[test]
fn unknown_export_never_runs_another() {
    let mut out = Vec::new();
    let err = Runner::default()
        .run(SQUARE.module, &[Invocation::new("cube").arg(4)], &mut out)
        .err()
        .unwrap();
    assert!(matches!(err, Error::ExportNotFound(ref name) if name == "cube"));
    assert!(out.is_empty());
}

#[test]
fn gas() {
    let mut out = Vec::new();
    let outcomes = scenarios::gas(scenarios::GAS_LIMIT, 10, &mut out).unwrap();

    let values = outcomes
        .iter()
        .map(|o| o.value.clone())
        .collect::<Vec<_>>();
    let expected = [1, 1, 2, 3, 5, 8, 13, 21, 34, 55]
        .into_iter()
        .map(|v| Some(Value::I32(v)))
        .collect::<Vec<_>>();
    assert_eq!(values, expected);

    // deeper recursion costs more fuel
    let fuel = outcomes
        .iter()
        .map(|o| o.fuel_consumed.unwrap())
        .collect::<Vec<_>>();
    assert!(fuel.windows(2).all(|w| w[0] <= w[1]), "{fuel:?}");
    assert!(fuel[9] > fuel[0]);

    let text = String::from_utf8(out).unwrap();
    // one line per call
    assert_eq!(text.lines().count(), outcomes.len());
    let last = text.lines().last().unwrap();
    assert!(last.starts_with("consumed "));
    assert!(last.ends_with(" to compute fib(10) = 55"));
}

#[test]
fn gas_runs_out() {
    let mut out = Vec::new();
    let err = scenarios::gas(100, 20, &mut out).err().unwrap();
    assert!(matches!(
        err,
        Error::Invocation {
            cause: InvocationError::OutOfFuel,
            ..
        }
    ));
}
