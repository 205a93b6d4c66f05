use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::{debug, warn};

use localrag_cli::{build_retriever, init_tracing, load_settings};
use localrag_core::session::{Role, SessionId, SessionStore};
use localrag_retriever::{extractive_answer, format_context};

const HELP: &str = "Commands: /reset, /session <id>, /context, /stats, /quit";

fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = load_settings()?;
    let retriever = build_retriever(&settings)?;
    let sessions = SessionStore::conversations(&settings.session);
    let k = settings.retriever.k;

    let mut session: SessionId = 0;
    let mut last_context = String::new();
    println!("{} chunks indexed. {HELP}", retriever.stats().chunks);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let now = Instant::now();
        sessions.evict_idle(now);

        match input.split_once(' ').map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) | ("/exit", _) => break,
            ("/help", _) => println!("{HELP}"),
            ("/reset", _) => {
                sessions.reset(session, now);
                println!("History cleared.");
            }
            ("/session", id) => match id.parse() {
                Ok(id) => {
                    session = id;
                    let turns = sessions.with_session(session, now, |h| h.len());
                    println!("Session {session} ({turns} turns).");
                }
                Err(_) => println!("Usage: /session <id>"),
            },
            ("/context", _) => println!("{}", if last_context.is_empty() { "(none)" } else { last_context.as_str() }),
            ("/stats", _) => println!("{}", serde_json::to_string_pretty(&retriever.stats())?),
            _ => {
                sessions.with_session(session, now, |h| h.push(Role::User, input));
                let hits = retriever.retrieve(input, k).unwrap_or_else(|e| {
                    warn!(error = %e, "retrieval failed");
                    Vec::new()
                });
                debug!(session, hits = hits.len(), "retrieved");
                last_context = format_context(&hits);
                let answer = extractive_answer(&hits, k);
                sessions.with_session(session, now, |h| h.push(Role::Assistant, &answer));
                println!("{answer}");
            }
        }
    }
    Ok(())
}
