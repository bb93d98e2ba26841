use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use drillmap::api::{ClientConfig, Endpoints};
use drillmap::chart::RenderOptions;
use drillmap::models::KeyedValue;
use drillmap::{
    Client, DirSource, DrillEvent, GeoSource, RegionCode, SvgBackend, Transition, ViewController,
    ViewState, storage,
};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "drillmap",
    version,
    about = "Render a world map and drill down into country maps"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the world map.
    World(CommonArgs),
    /// Render the world map, then drill into one country.
    Drill {
        /// Two-letter country code (e.g., DE)
        region: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Read commands from stdin and update the map after each one.
    Explore(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// SVG file the map is drawn into.
    #[arg(short, long, default_value = "map.svg")]
    out: PathBuf,
    /// Read geography from a local mirror instead of the network.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Base URL of the map data host.
    #[arg(long)]
    base_url: Option<String>,
    /// Request timeout in seconds (no timeout when omitted).
    #[arg(long)]
    timeout: Option<u64>,
    /// Ignore HTTP_PROXY/HTTPS_PROXY from the environment.
    #[arg(long)]
    no_proxy: bool,
    /// CSV with `key,value` rows joined onto country maps by hc-key.
    #[arg(long)]
    values: Option<PathBuf>,
    /// Width of the map (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the map (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for numbers in labels and tooltips (e.g., en, de).
    #[arg(long, default_value = "en")]
    locale: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::World(common) => cmd_world(common),
        Command::Drill { region, common } => cmd_drill(&region, common),
        Command::Explore(common) => cmd_explore(common),
    }
}

fn source(args: &CommonArgs) -> Result<Box<dyn GeoSource>> {
    if let Some(dir) = args.data_dir.as_ref() {
        return Ok(Box::new(DirSource::new(dir)));
    }
    let mut config = ClientConfig::default();
    if let Some(url) = args.base_url.as_ref() {
        config.endpoints = Endpoints::new(url.clone());
    }
    config.timeout = args.timeout.map(Duration::from_secs);
    config.system_proxy = !args.no_proxy;
    let client = Client::new(config).context("build http client")?;
    Ok(Box::new(client))
}

fn mount(args: &CommonArgs) -> Result<ViewController<Box<dyn GeoSource>, SvgBackend>> {
    let values: Vec<KeyedValue> = match args.values.as_ref() {
        Some(p) => storage::load_values_csv(p)
            .with_context(|| format!("read values from {}", p.display()))?,
        None => Vec::new(),
    };
    let backend = SvgBackend::new(
        &args.out,
        RenderOptions {
            width: args.width,
            height: args.height,
            locale: args.locale.clone(),
        },
    );
    let mut view = ViewController::new(source(args)?, backend)
        .with_values(values)
        .with_locale(args.locale.clone());
    view.initialize().context("load world map")?;
    Ok(view)
}

fn cmd_world(args: CommonArgs) -> Result<()> {
    mount(&args)?;
    eprintln!("Wrote world map to {}", args.out.display());
    Ok(())
}

fn click<S: GeoSource>(
    view: &mut ViewController<S, SvgBackend>,
    raw: &str,
    as_library_drilldown: bool,
) -> Result<Transition> {
    let code = RegionCode::parse(raw)?;
    let Some(point) = view.find_point(&code).cloned() else {
        bail!("no area with code {} on the current map", code);
    };
    let event = if as_library_drilldown {
        DrillEvent::LibraryDrilldown {
            series_options: None,
            point,
        }
    } else {
        DrillEvent::PointClick { point }
    };
    Ok(view.handle(event)?)
}

fn report(t: &Transition, out: &Path) {
    match t {
        Transition::Ignored => eprintln!("Nothing to do"),
        Transition::Region(code) => eprintln!("Wrote map of {} to {}", code, out.display()),
        Transition::World => eprintln!("Wrote world map to {}", out.display()),
        Transition::Failed(e) => eprintln!("Failed: {e}"),
    }
}

fn cmd_drill(region: &str, args: CommonArgs) -> Result<()> {
    let mut view = mount(&args)?;
    let t = click(&mut view, region, false)?;
    report(&t, &args.out);
    if let Transition::Failed(e) = t {
        bail!(e);
    }
    Ok(())
}

const HELP: &str = "commands: click <cc> | drilldown <cc> | up | info <key> | export <file.csv|file.json> | state | quit";

fn cmd_explore(args: CommonArgs) -> Result<()> {
    let mut view = mount(&args)?;
    eprintln!("{HELP}");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        let arg = parts.next();
        let result: Result<()> = match (cmd, arg) {
            ("click", Some(cc)) => click(&mut view, cc, false).map(|t| report(&t, &args.out)),
            ("drilldown", Some(cc)) => click(&mut view, cc, true).map(|t| report(&t, &args.out)),
            ("up", _) => {
                let event = view.drill_up_event();
                view.handle(event)
                    .map(|t| report(&t, &args.out))
                    .map_err(Into::into)
            }
            ("info", Some(key)) => {
                // world areas have no tooltip; fall back to the name
                let text = view
                    .tooltip(key)
                    .or_else(|| view.find_area(key).map(|p| p.name))
                    .unwrap_or_else(|| format!("no area {key}"));
                writeln!(stdout, "{text}").map_err(Into::into)
            }
            ("export", Some(path)) => export(&view.current_points(), Path::new(path)),
            ("state", _) => {
                let s = match view.state() {
                    ViewState::Region { code, name } => format!("region {code} ({name})"),
                    other => format!("{other:?}").to_lowercase(),
                };
                writeln!(stdout, "{s}").map_err(Into::into)
            }
            ("quit" | "exit", _) => break,
            _ => {
                eprintln!("{HELP}");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("error: {e:#}");
        }
    }
    Ok(())
}

fn export(points: &[drillmap::MapPoint], path: &Path) -> Result<()> {
    let fmt = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(points, path)?,
        "json" => storage::save_json(points, path)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", points.len(), path.display());
    Ok(())
}
