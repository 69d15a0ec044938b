use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{query::DEFAULT_MAX_PAGE_SIZE, resource, QueryParams};
use folio_storage::{PersistentStore, PipelineExecutor};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about="Folio content admin CLI", long_about=None)]
struct Cli {
    /// Directory holding the server's `wal/` folder
    #[arg(long, env = "DATA_DIR")]
    data_dir: PathBuf,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run a list query offline, e.g. `list events --param price[gte]=100`
    List {
        kind: String,
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = DEFAULT_MAX_PAGE_SIZE)]
        max_page_size: usize,
    },
    /// Print every stored document as JSON lines
    Dump {
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{raw}'"))?;
    Ok((k.to_string(), v.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = PersistentStore::load(&cli.data_dir)
        .with_context(|| format!("replaying {}", cli.data_dir.display()))?;
    match cli.cmd {
        Cmd::List {
            kind,
            params,
            max_page_size,
        } => {
            let resource = resource::lookup(&kind)?;
            let params = QueryParams::from(params);
            let rt = tokio::runtime::Builder::new_current_thread().build()?;
            let page = rt.block_on(
                PipelineExecutor::new(&store).list(resource, &params, max_page_size),
            )?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Cmd::Dump { kind, out } => {
            let mut s = String::new();
            for doc in store
                .all_documents()
                .into_iter()
                .filter(|d| kind.as_deref().map_or(true, |k| d.kind == k))
            {
                s.push_str(&serde_json::to_string(&doc)?);
                s.push('\n');
            }
            match out {
                Some(path) => std::fs::write(path, s)?,
                None => print!("{s}"),
            }
        }
    }
    Ok(())
}
