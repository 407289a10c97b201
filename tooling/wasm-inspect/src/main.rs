use clap::Parser;
use wasmrun_host::{Compiled, Export, Import, Runner, Signature};
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    kind: String,
    name: String,
    params: String,
    results: String,
}

impl Row {
    fn new(kind: String, name: String, sig: Option<&Signature>) -> Self {
        let (params, results) = match sig {
            Some(sig) => (sig.params.join(", "), render_results(sig)),
            None => ("-".to_string(), "-".to_string()),
        };

        Self {
            kind,
            name,
            params,
            results,
        }
    }
}

impl From<&Export> for Row {
    fn from(export: &Export) -> Self {
        Row::new(export.kind.to_string(), export.name.clone(), export.sig.as_ref())
    }
}

impl From<&Import> for Row {
    fn from(import: &Import) -> Self {
        Row::new(
            import.kind.to_string(),
            format!("{}::{}", import.module, import.name),
            import.sig.as_ref(),
        )
    }
}

fn render_results(sig: &Signature) -> String {
    match sig.results.len() {
        0 => "()".to_string(),
        _ => sig.results.join(", "),
    }
}

fn table<'a, T, I>(title: &str, items: I) -> Table
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    Row: From<&'a T>,
{
    let mut table = Table::new(items.into_iter().map(Row::from));
    table.with(Style::modern());
    table.with(Panel::header(title));
    table
}

fn inspect(compiled: &Compiled) -> String {
    let exports = compiled.exports();
    let imports = compiled.imports();
    log::debug!("{} exports, {} imports", exports.len(), imports.len());

    let imports = match imports.is_empty() {
        true => "no imports".to_string(),
        false => table("Imports", &imports).to_string(),
    };
    format!("{}\n\n{}", table("Exports", &exports), imports)
}

const ENV_FILE: &str = "FILE";
const ENV_DEBUG: &str = "DEBUG";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = ENV_FILE)]
    file: String,

    #[arg(short, long, env = ENV_DEBUG, default_value_t = false)]
    debug: bool,
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

    let runner = Runner::default();
    let buffer = runner.load(&args.file)?;
    let compiled = runner.compile(&buffer)?;
    println!("{}", inspect(&compiled));

    Ok(())
}
