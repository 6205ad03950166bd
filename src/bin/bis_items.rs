//! Command-line front end for the item catalog.
//!
//! Each subcommand maps onto one `CatalogService` operation and prints JSON
//! on stdout, so the binary doubles as a scriptable stand-in for the HTTP
//! handlers. Logs go to stderr (`RUST_LOG` controls the level).
//!
//! The dataset comes from `--items <path>` when given, otherwise from the
//! environment (see `bisgear::config`).

use anyhow::{Context, Result, bail};
use bisgear::query::parse_int_prefix;
use bisgear::sharing::{self, ids_from_url};
use bisgear::{
    CatalogService, ItemId, QuickSearchParams, SearchParams, ServiceConfig, group_by_slot,
    level_timeline, parse_item_ids,
};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let Cli {
        items_path,
        command,
    } = Cli::parse(env::args().skip(1))?;
    let service = match command {
        Command::Help => usage(0),
        Command::Share { ids, base } => {
            let ids = parse_item_ids(&ids)?;
            match base {
                Some(base) => println!("{}", sharing::share_url(&base, &ids)?),
                None => println!("{}", sharing::encode_share_code(&ids)),
            }
            return Ok(());
        }
        _ => build_service(items_path)?,
    };

    match command {
        Command::Search(pairs) => {
            let params = SearchParams::from_query_pairs(pairs);
            print_json(&service.search(&params)?)
        }
        Command::Quick(pairs) => {
            let params = QuickSearchParams::from_query_pairs(pairs);
            print_json(&service.quick_search(&params)?)
        }
        Command::Get(raw) => {
            let id = parse_single_id(&raw)?;
            match service.get_item_by_id(id)? {
                Some(item) => print_json(&item),
                None => bail!("Item not found: {id}"),
            }
        }
        Command::Batch(BatchInput::Ids(raw)) => {
            let ids = parse_item_ids(&raw)?;
            print_json(&BatchResponse {
                items: service.get_items_by_ids(&ids)?,
            })
        }
        Command::Batch(BatchInput::Json(body)) => {
            let value: Value = serde_json::from_str(&body).context("parsing batch request body")?;
            let ids = bisgear::query::parse_batch_request(&value)?;
            print_json(&BatchResponse {
                items: service.get_items_by_ids(&ids)?,
            })
        }
        Command::Meta => print_json(&service.get_items_metadata()?),
        Command::Best { level, ids } => {
            let ids = resolve_list_ids(&ids)?;
            print_json(&service.best_items_for_ids(&ids, level)?)
        }
        Command::Timeline(raw) => {
            let ids = resolve_list_ids(&raw)?;
            let items = service.get_items_by_ids(&ids)?;
            print_json(&level_timeline(&group_by_slot(&items)))
        }
        Command::Unshare(code) => {
            let ids = resolve_list_ids(&code)?;
            print_json(&BatchResponse {
                items: service.get_items_by_ids(&ids)?,
            })
        }
        Command::Help | Command::Share { .. } => Ok(()),
    }
}

#[derive(Serialize)]
struct BatchResponse {
    items: Vec<bisgear::Item>,
}

fn build_service(items_path: Option<PathBuf>) -> Result<CatalogService> {
    let config = match items_path {
        Some(path) => ServiceConfig::new(path),
        None => ServiceConfig::from_env()?,
    };
    CatalogService::from_config(&config)
        .with_context(|| format!("opening item catalog {}", config.items_path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{rendered}");
    Ok(())
}

fn parse_single_id(raw: &str) -> Result<ItemId> {
    match parse_int_prefix(raw) {
        Some(id) if id > 0 => {
            let id = u32::try_from(id).with_context(|| format!("item id {raw} is out of range"))?;
            Ok(ItemId(id))
        }
        _ => bail!("Invalid item ID: {raw}"),
    }
}

/// Accept an id list, a share code, or a shared URL.
fn resolve_list_ids(raw: &str) -> Result<Vec<ItemId>> {
    if let Ok(ids) = parse_item_ids(raw) {
        return Ok(ids);
    }
    if let Some(ids) = ids_from_url(raw) {
        return Ok(ids);
    }
    if let Some(ids) = sharing::decode_share_code(raw) {
        return Ok(ids);
    }
    bail!("expected item ids, a share code, or a shared link; got '{raw}'")
}

enum BatchInput {
    Ids(String),
    Json(String),
}

enum Command {
    Help,
    Search(Vec<(String, String)>),
    Quick(Vec<(String, String)>),
    Get(String),
    Batch(BatchInput),
    Meta,
    Best { level: u32, ids: String },
    Timeline(String),
    Share { ids: String, base: Option<String> },
    Unshare(String),
}

struct Cli {
    items_path: Option<PathBuf>,
    command: Command,
}

// Flag → query key, mirroring the HTTP query string names.
const SEARCH_FLAGS: &[(&str, &str)] = &[
    ("--q", "q"),
    ("--query", "q"),
    ("--slot", "slot"),
    ("--quality", "quality"),
    ("--class", "class"),
    ("--subclass", "subclass"),
    ("--min-level", "minLevel"),
    ("--max-level", "maxLevel"),
    ("--page", "page"),
    ("--limit", "limit"),
];

const QUICK_FLAGS: &[(&str, &str)] = &[
    ("--q", "q"),
    ("--query", "q"),
    ("--slot", "slot"),
    ("--class", "class"),
    ("--limit", "limit"),
];

impl Cli {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        let mut items_path = None;
        let mut rest: Vec<String> = Vec::new();
        let mut iter = args;
        while let Some(arg) = iter.next() {
            if arg == "--items" {
                let value = iter.next().context("--items requires a path")?;
                items_path = Some(PathBuf::from(value));
            } else {
                rest.push(arg);
            }
        }

        let mut rest = rest.into_iter();
        let Some(name) = rest.next() else {
            usage(1);
        };
        let args: Vec<String> = rest.collect();

        let command = match name.as_str() {
            "--help" | "-h" | "help" => Command::Help,
            "search" => Command::Search(flag_pairs(&args, SEARCH_FLAGS)?),
            "quick" => Command::Quick(flag_pairs(&args, QUICK_FLAGS)?),
            "get" => Command::Get(single_positional(&args, "get <id>")?),
            "batch" => match args.as_slice() {
                [flag, body] if flag == "--json" => Command::Batch(BatchInput::Json(body.clone())),
                [] => bail!("batch requires item ids or --json <body>"),
                ids => Command::Batch(BatchInput::Ids(ids.join(" "))),
            },
            "meta" => Command::Meta,
            "best" => {
                let mut level = None;
                let mut ids = Vec::new();
                let mut iter = args.iter();
                while let Some(arg) = iter.next() {
                    if arg == "--level" {
                        let raw = iter.next().context("--level requires a value")?;
                        level = Some(parse_level(raw)?);
                    } else {
                        ids.push(arg.clone());
                    }
                }
                let level = level.context("best requires --level <1-60>")?;
                if ids.is_empty() {
                    bail!("best requires item ids, a share code, or a shared link");
                }
                Command::Best {
                    level,
                    ids: ids.join(" "),
                }
            }
            "timeline" => {
                if args.is_empty() {
                    bail!("timeline requires item ids, a share code, or a shared link");
                }
                Command::Timeline(args.join(" "))
            }
            "share" => {
                let mut base = None;
                let mut ids = Vec::new();
                let mut iter = args.iter();
                while let Some(arg) = iter.next() {
                    if arg == "--base" {
                        base = Some(iter.next().context("--base requires a url")?.clone());
                    } else {
                        ids.push(arg.clone());
                    }
                }
                Command::Share {
                    ids: ids.join(" "),
                    base,
                }
            }
            "unshare" => Command::Unshare(single_positional(&args, "unshare <code|url>")?),
            other => bail!("unknown command '{other}' (see --help)"),
        };

        Ok(Self {
            items_path,
            command,
        })
    }
}

fn flag_pairs(args: &[String], flags: &[(&str, &str)]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some((_, key)) = flags.iter().find(|(flag, _)| flag == arg) else {
            bail!("unsupported flag {arg}");
        };
        let value = iter
            .next()
            .with_context(|| format!("{arg} requires a value"))?;
        pairs.push((key.to_string(), value.clone()));
    }
    Ok(pairs)
}

fn single_positional(args: &[String], usage_hint: &str) -> Result<String> {
    match args {
        [value] => Ok(value.clone()),
        _ => bail!("usage: bis-items {usage_hint}"),
    }
}

fn parse_level(raw: &str) -> Result<u32> {
    let level: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid level '{raw}'"))?;
    if !(1..=60).contains(&level) {
        bail!("level must be between 1 and 60, got {level}");
    }
    Ok(level)
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: bis-items [--items <path>] <command> [args]\n\nCommands:\n  search [--q TEXT] [--slot S] [--quality Q] [--class C] [--subclass S]\n         [--min-level N] [--max-level N] [--page N] [--limit N]\n                        Paginated search with exact filters.\n  quick [--q TEXT] [--slot S] [--class C] [--limit N]\n                        Substring search, first N results (default 50).\n  get <id>              Print one item.\n  batch <ids...>        Print known items among up to 100 ids.\n  batch --json <body>   Same, from a {{\"itemIds\": [...]}} request body.\n  meta                  Facet values and required-level range.\n  best --level N <ids|code|url>\n                        Best item per slot at level N.\n  timeline <ids|code|url>\n                        Levels at which each slot upgrades.\n  share <ids...> [--base URL]\n                        Print a share code (or link when --base is given).\n  unshare <code|url>    Print the items behind a share code or link.\n\nEnvironment:\n  BIS_ITEMS_PATH, BIS_ROOT, BIS_CACHE_TTL_SECS, BIS_ITEM_SCHEMA, RUST_LOG"
    );
    std::process::exit(code);
}
