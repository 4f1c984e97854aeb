use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trellis", version)]
struct Cli {
    /// Log filter (`RUST_LOG` syntax).
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one request cycle against a page and print the response.
    Render(RenderArgs),
    /// Validate every component template of an application.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Application definition JSON.
    #[arg(long)]
    app: PathBuf,

    /// Page component to render (defaults to the application's main page).
    #[arg(long)]
    page: Option<String>,

    /// Submitted form value as `<element-id>=<value>` (repeatable).
    #[arg(long = "form", value_parser = parse_form_value)]
    form: Vec<(String, String)>,

    /// Element id of the control that triggered the request.
    #[arg(long)]
    sender: Option<String>,

    /// Enable the skip optimization.
    #[arg(long)]
    allow_skipping: bool,

    /// Record semantic labels and print them after the response.
    #[arg(long)]
    record: bool,

    /// Print traversal counters to stderr.
    #[arg(long)]
    stats: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Application definition JSON.
    #[arg(long)]
    app: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_form_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected <element-id>=<value>, got '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).with_context(|| "parse --log filter")?)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_app_json(path: &Path) -> anyhow::Result<trellis::AppDef> {
    let f = File::open(path).with_context(|| format!("open app definition '{}'", path.display()))?;
    let r = BufReader::new(f);
    let def: trellis::AppDef =
        serde_json::from_reader(r).with_context(|| "parse app definition JSON")?;
    Ok(def)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut def = read_app_json(&args.app)?;
    def.options.allows_skipping |= args.allow_skipping;
    def.options.debug.record_playback |= args.record;

    let app = trellis::Application::from_def(&def)?;
    let page_name = match &args.page {
        Some(p) => p.clone(),
        None => def.main_page()?.to_owned(),
    };
    let mut page = app.create_page(&page_name)?;

    let mut request = trellis::Request::new();
    for (id, value) in args.form {
        request = request.with_form_value(id, value);
    }
    if let Some(sender) = args.sender {
        request = request.with_sender_id(sender);
    }

    let outcome = app.handle_request(&mut page, &request)?;
    println!("{}", outcome.content);

    if let Some(target) = &outcome.navigated_to {
        eprintln!("navigated to {target}");
    }
    if args.record {
        for label in &outcome.recorded {
            eprintln!("{}\t{}", label.element_id, label.label);
        }
    }
    if args.stats {
        eprintln!(
            "{}",
            serde_json::to_string(&outcome.stats).with_context(|| "serialize stats")?
        );
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let def = read_app_json(&args.app)?;
    let registry = def.build_registry()?;
    let report = registry.validate_all();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).with_context(|| "serialize report")?
        );
    } else {
        for d in report.iter() {
            println!("{d}");
        }
    }

    if report.has_errors() {
        anyhow::bail!("{} validation error(s)", report.error_count());
    }
    eprintln!("ok: {} component(s)", registry.len());
    Ok(())
}
