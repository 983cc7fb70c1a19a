use anyhow::Context as _;
use anyhow::Result;
use rbdef_cli::{parse_setting, perform_call, signatures};
use rbdef_engine::{Registry, Value};

use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(name = "rbdef")]
struct Cli {
    /// Call expression like `Foo.test?("test a")` or `Foo._hoge!`
    #[structopt(long, required_unless = "signatures")]
    call: Option<String>,

    /// Attribute to set on the receiving instance, as `name=value`.
    /// May be given more than once.
    #[structopt(long = "set", parse(try_from_str = parse_setting))]
    attrs: Vec<(String, Value)>,

    /// Output as JSON
    #[structopt(long)]
    json: bool,

    /// List the signatures of every registered method and exit
    #[structopt(long)]
    signatures: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_file(true)
        .with_line_number(true)
        .without_time()
        .init();
    let cli = Cli::from_args();
    tracing::debug!("arguments parsed: {:?}", cli);

    let registry = Registry::builtin();

    if cli.signatures {
        let entries = signatures(&registry);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for e in &entries {
                let sep = if e.kind == "singleton" { "." } else { "#" };
                println!("{}{}{}", e.class, sep, e.display);
            }
        }
        return Ok(());
    }

    let call = cli.call.context("missing --call")?;
    let outcome = perform_call(&registry, &call, &cli.attrs)?;
    info!("call evaluated successfully");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    } else {
        println!("{}", outcome);
    }

    Ok(())
}
