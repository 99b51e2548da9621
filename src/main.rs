use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use ssc_match::{AppConfig, CodeCache, ConfusionMatcher, EncodeMode, MatcherConfig, PinyinCoder};

struct Session {
    matcher: ConfusionMatcher,
    business: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    println!("ssc-match v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load();
    debug!("Loaded configuration");

    let mut args = env::args().skip(1);
    if let Some(dictionary) = args.next() {
        config.dictionary_path = Some(PathBuf::from(dictionary));
    }
    if let Some(business) = args.next() {
        config.default_business = Some(business);
    }

    let code_cache = match &config.code_table_path {
        Some(path) => CodeCache::load(path)
            .with_context(|| format!("failed to load code tables {}", path.display()))?,
        None => {
            if config.encode_mode == EncodeMode::SoundShape {
                warn!("sound_shape mode without code tables: every shape part compares equal");
            }
            CodeCache::default()
        }
    };
    let coder = PinyinCoder::new(CodeCache::install(code_cache));

    let matcher = ConfusionMatcher::new(MatcherConfig::from(&config), Arc::new(coder));
    info!(
        "encode mode {}, similarity threshold {}",
        config.encode_mode, config.similarity_threshold
    );

    let mut session = Session {
        matcher,
        business: config.default_business.clone(),
    };

    println!("Type a slot to match, or 'help' for commands.\n");
    run_repl(&mut session)?;

    Ok(())
}

fn run_repl(session: &mut Session) -> Result<()> {
    loop {
        match &session.business {
            Some(business) => print!("[{business}]> "),
            None => print!("> "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" | "h" => print_help(),
            ":business" | ":b" => {
                if rest.is_empty() {
                    println!("Usage: :business <name>");
                } else {
                    session.business = Some(rest.to_string());
                    println!("Using business [{rest}]");
                }
            }
            ":scan" | ":s" => {
                let Some(business) = session.business.as_deref() else {
                    println!("Select a business first with :business <name>");
                    continue;
                };
                match session.matcher.scan(business, rest) {
                    Ok(matches) => print_json(&matches)?,
                    Err(err) => println!("Error: {err}"),
                }
            }
            ":sim" => {
                let Some((a, b)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: :sim <word> <word>");
                    continue;
                };
                let similarity = session.matcher.compute_similarity(a, b.trim());
                println!("{:.4} matched={}", similarity.score, similarity.matched);
            }
            ":reload" => {
                let target = if rest.is_empty() {
                    session.matcher.dictionary_path()
                } else {
                    Some(PathBuf::from(rest))
                };
                match target {
                    Some(path) => reload(session, &path),
                    None => println!("Usage: :reload <path>"),
                }
            }
            ":save" => save(session),
            _ => {
                let Some(business) = session.business.as_deref() else {
                    println!("Select a business first with :business <name>");
                    continue;
                };
                match session.matcher.match_slot(business, trimmed) {
                    Ok(result) => print_json(&result)?,
                    Err(err) => println!("Error: {err}"),
                }
            }
        }
    }

    Ok(())
}

fn reload(session: &Session, path: &Path) {
    match session.matcher.set_dictionary_path(path) {
        Ok(()) => println!("Reloaded {}", path.display()),
        Err(err) => println!("Error: {err}"),
    }
}

fn save(session: &Session) {
    let mut config = AppConfig::load();
    config.dictionary_path = session.matcher.dictionary_path();
    config.default_business = session.business.clone();
    match config.save() {
        Ok(path) => println!("Saved {}", path.display()),
        Err(err) => println!("Error: {err}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render result")?;
    println!("{rendered}");
    Ok(())
}

fn print_help() {
    println!();
    println!("ssc-match Commands:");
    println!("  <slot>              - Match a slot against the current business");
    println!("  :business <name>    - Switch business (alias :b)");
    println!("  :scan <text>        - Find known aliases inside a sentence (alias :s)");
    println!("  :sim <a> <b>        - Fine sound-shape similarity of two words");
    println!("  :reload [path]      - Reload the confusion dictionary");
    println!("  :save               - Store dictionary and business in the config");
    println!("  help, h             - Show this help message");
    println!("  quit, q             - Exit ssc-match");
    println!();
    println!("Examples:");
    println!("  :business traffic");
    println!("  交通先行");
    println!("  :scan 今天交通先行吗");
    println!();
}
