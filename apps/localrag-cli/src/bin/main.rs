use std::env;

use localrag_cli::{build_retriever, init_tracing, load_settings, parse_command, Command, USAGE};
use localrag_core::types::SearchHit;

fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No results");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        let source = hit.chunk.source().unwrap_or_else(|| "unknown".to_string());
        let page = hit.chunk.page().unwrap_or_else(|| "N/A".to_string());
        println!("{}. [{} {:.4}] {} (p. {})", i + 1, hit.source, hit.score, source, page);
        println!("   {}", hit.chunk.content.replace('\n', " "));
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    let (command, k) = parse_command(&args).unwrap_or_else(|msg| {
        eprintln!("{msg}\n{USAGE}");
        std::process::exit(1)
    });
    let settings = load_settings()?;
    let k = k.unwrap_or(settings.retriever.k);
    let retriever = build_retriever(&settings)?;

    match command {
        Command::Stats => println!("{}", serde_json::to_string_pretty(&retriever.stats())?),
        Command::Query(query) => print_hits(&retriever.retrieve(&query, k)?),
        Command::Keywords(query) => print_hits(&retriever.keyword_search(&query, k)?),
    }
    Ok(())
}
