use anyhow::Result;
use clap::{Parser, Subcommand};
use watchlink::notes::{render_note, FsNoteSink, NoteOptions, NoteSink};
use watchlink::relations::fetch_with_relationships;
use watchlink::{ApiClient, Config, SearchParams};

#[derive(Parser, Debug)]
#[command(name = "watchlink")]
#[command(about = "Sanctions watchlist entity enrichment with relationship graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the watchlist index for matching entities
    Search {
        query: String,
        /// Restrict matches to one schema, e.g. Person or Company
        #[arg(long)]
        schema: Option<String>,
        /// Restrict matches to one dataset
        #[arg(long)]
        dataset: Option<String>,
        /// Comma-separated topic filter, e.g. sanction
        #[arg(long)]
        topics: Option<String>,
        /// Comma-separated country filter
        #[arg(long)]
        countries: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Fetch one entity and resolve its relationship graph
    Enrich {
        id: String,
        /// Render the enriched entity as a Markdown note and persist it
        #[arg(short, long)]
        write: bool,
    },
    /// Print the upstream dataset catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let client = ApiClient::new(&config)?;

    match cli.command {
        Command::Search {
            query,
            schema,
            dataset,
            topics,
            countries,
            limit,
        } => {
            let params = SearchParams {
                query,
                schema,
                dataset,
                topics,
                countries,
                limit,
                offset: None,
            };
            run_search(&client, &params).await?;
        }
        Command::Enrich { id, write } => {
            run_enrich(&client, &config, &id, write).await?;
        }
        Command::Catalog => {
            let catalog = client.catalog().await?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }

    Ok(())
}

async fn run_search(client: &ApiClient, params: &SearchParams) -> Result<()> {
    let response = client.search(params).await?;

    println!("Query: \"{}\"\n", params.query);
    if response.results.is_empty() {
        println!("No matching entities.");
        return Ok(());
    }

    for entity in &response.results {
        println!("{}  [{}]  {}", entity.id, entity.schema, entity.caption);
    }

    let qualifier = if response.total.relation == "gte" { "at least " } else { "" };
    println!("\nMatches: {}{}", qualifier, response.total.value);
    Ok(())
}

async fn run_enrich(client: &ApiClient, config: &Config, id: &str, write: bool) -> Result<()> {
    log::info!("Enriching entity {}", id);
    let enriched = fetch_with_relationships(client, id).await?;

    let entity = &enriched.entity;
    println!("{}  [{}]  {}", entity.id, entity.schema, entity.caption);
    if !entity.datasets.is_empty() {
        println!("Datasets: {}", entity.datasets.join(", "));
    }

    if enriched.relationships.is_empty() {
        println!("\nNo relationships found.");
    } else {
        for (category, names) in enriched.relationships.sections() {
            if names.is_empty() {
                continue;
            }
            println!("\n{}:", category.label());
            for name in names {
                println!("  - {}", name);
            }
        }
    }

    if write {
        let options = NoteOptions::from(&config.notes);
        let (filename, content) = render_note(&enriched, &options);
        let sink = FsNoteSink::new(config.notes_folder());
        sink.write_note(&filename, &content)?;
        log::info!(
            "Note written to {}",
            config.notes_folder().join(&filename).display()
        );
    }

    Ok(())
}
