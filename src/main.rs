//! # Precedent Search CLI Driver
//!
//! ## Purpose
//! Thin command-line collaborator around the engine: loads a corpus file,
//! builds the reference table, runs one search or listing query, and prints
//! the JSON envelope the engine returns. Transport concerns stay out of the
//! engine proper; this binary is the stand-in for whatever service layer
//! embeds the library.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging
//! 3. Load the corpus and swap in the reference table snapshot
//! 4. Run the requested query (search, statute listing, article listing)
//! 5. Print the JSON result to stdout

use clap::{Arg, ArgAction, Command};
use tracing::info;

use precedent_search::{
    CategoryFilter, Config, CorpusLoader, QuerySpec, ReferenceFilter, ReferenceIndex, Result,
    SearchError, SearchMode, SearchPipeline, SortOrder,
};

fn main() -> Result<()> {
    let matches = Command::new("precedent-search")
        .version("1.0.0")
        .author("Legal Search Team")
        .about("Keyword search over a court precedent corpus")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("Corpus JSON file (category → case list)")
                .required(true),
        )
        .arg(
            Arg::new("list-statutes")
                .long("list-statutes")
                .help("List all cited statutes and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("articles")
                .long("articles")
                .value_name("STATUTE")
                .help("List the cited articles of one statute and exit"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Keyword combination mode: SINGLE, OR, AND, AND_OR")
                .default_value("SINGLE"),
        )
        .arg(
            Arg::new("keyword")
                .short('k')
                .long("keyword")
                .value_name("KEYWORD")
                .help("Search keyword (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .value_name("TERM")
                .help("Exclusion term (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("CATEGORY")
                .help("Restrict to a corpus category (repeatable, \"전체\" = all)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("statute")
                .long("statute")
                .value_name("STATUTE")
                .help("Restrict to cases citing this statute"),
        )
        .arg(
            Arg::new("article")
                .long("article")
                .value_name("ARTICLE")
                .help("Restrict further to one article (requires --statute)"),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_name("ORDER")
                .help("Result order: default, latest, oldest")
                .default_value("default"),
        )
        .arg(
            Arg::new("page")
                .short('p')
                .long("page")
                .value_name("N")
                .help("1-based page number")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            Arg::new("page-size")
                .long("page-size")
                .value_name("N")
                .help("Results per page")
                .value_parser(clap::value_parser!(usize))
                .default_value("20"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = Config::from_file(config_path)?;

    init_logging(&config);
    info!("Starting precedent search v1.0.0");

    // Load the corpus and publish the reference table snapshot
    let loader = CorpusLoader::new(&config);
    let data_path = matches.get_one::<String>("data").unwrap();
    let records = loader.load_json_file(data_path)?;
    let reference_index = ReferenceIndex::new();
    reference_index.swap(loader.build_reference_table(&records));
    let references = reference_index.snapshot();

    // Listing queries short-circuit before any search work
    if matches.get_flag("list-statutes") {
        println!("{}", serde_json::to_string_pretty(&references.statutes())?);
        return Ok(());
    }
    if let Some(statute) = matches.get_one::<String>("articles") {
        println!("{}", serde_json::to_string_pretty(&references.articles(statute))?);
        return Ok(());
    }

    let spec = QuerySpec {
        mode: parse_mode(matches.get_one::<String>("mode").unwrap())?,
        keywords: collect_values(&matches, "keyword"),
        exclude: collect_values(&matches, "exclude"),
        sort_by: parse_sort(matches.get_one::<String>("sort").unwrap())?,
        page: *matches.get_one::<usize>("page").unwrap(),
        page_size: *matches.get_one::<usize>("page-size").unwrap(),
    };

    let category_filter = CategoryFilter::new(
        config.data.category_field.clone(),
        collect_values(&matches, "category"),
    );
    let reference_filter = matches.get_one::<String>("statute").map(|statute| {
        ReferenceFilter::new(
            config.data.reference_field.clone(),
            statute.clone(),
            matches.get_one::<String>("article").cloned(),
        )
    });

    let pipeline = SearchPipeline::new(&config);
    let response = pipeline.search_filtered(&records, &spec, |record| {
        category_filter.matches(record)
            && reference_filter
                .as_ref()
                .map_or(true, |filter| filter.matches(record))
    });

    info!(total = response.total, "search complete");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Initialize logging; `RUST_LOG` overrides the configured level
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn collect_values(matches: &clap::ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_mode(mode: &str) -> Result<SearchMode> {
    match mode {
        "SINGLE" => Ok(SearchMode::Single),
        "OR" => Ok(SearchMode::Or),
        "AND" => Ok(SearchMode::And),
        "AND_OR" => Ok(SearchMode::AndOr),
        other => Err(SearchError::Config {
            message: format!("Unknown mode: {}", other),
        }),
    }
}

fn parse_sort(order: &str) -> Result<SortOrder> {
    match order {
        "default" => Ok(SortOrder::Default),
        "latest" => Ok(SortOrder::Latest),
        "oldest" => Ok(SortOrder::Oldest),
        other => Err(SearchError::Config {
            message: format!("Unknown sort order: {}", other),
        }),
    }
}
