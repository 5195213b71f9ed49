mod db;
mod export;
mod fetch;
mod html;
mod parser;
mod sites;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::warn;

use crate::fetch::Fetcher;
use crate::parser::TocNode;
use crate::sites::Site;

/// Politeness delay between consecutive page fetches on one site.
const PAGE_DELAY: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "philo_scraper", about = "SEP/IEP philosophy encyclopedia scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the site indexes and populate the page queues
    Init {
        /// Restrict to one site (default: both)
        #[arg(short, long)]
        site: Option<Site>,
    },
    /// Scrape unvisited pages, extract fields, store entries
    Scrape {
        /// Max pages per site (default: all unvisited)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Restrict to one site (default: both)
        #[arg(short, long)]
        site: Option<Site>,
    },
    /// Populate empty queues, then scrape both sites
    Run {
        /// Max pages per site
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show per-site crawl statistics
    Stats,
    /// Stored entries overview table
    Overview {
        /// Max rows per site
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Restrict to one site (default: both)
        #[arg(short, long)]
        site: Option<Site>,
    },
    /// Export (title, body) rows from both sites as CSV
    ExportCsv {
        #[arg(long, default_value = "title_body.csv")]
        out: PathBuf,
    },
    /// Export title -> {abstract, contents} from both sites as JSON
    ExportJson {
        #[arg(long, default_value = "title_abstract_contents.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { site } => {
            for site in selected(site) {
                let conn = db::connect(site)?;
                db::init_schema(&conn)?;
                let fetcher = Fetcher::new()?;
                let uris = site.page_uris(&fetcher).await?;
                let inserted = db::insert_pages(&conn, &uris)?;
                println!(
                    "{}: inserted {} new page URIs ({} found in index)",
                    site.name(),
                    inserted,
                    uris.len()
                );
            }
            Ok(())
        }
        Commands::Scrape { limit, site } => scrape_sites(&selected(site), limit).await,
        Commands::Run { limit } => {
            for site in Site::ALL {
                let conn = db::connect(site)?;
                db::init_schema(&conn)?;
                if db::get_stats(&conn)?.total == 0 {
                    let fetcher = Fetcher::new()?;
                    let uris = site.page_uris(&fetcher).await?;
                    let inserted = db::insert_pages(&conn, &uris)?;
                    println!("{}: queued {} page URIs", site.name(), inserted);
                }
            }
            scrape_sites(&Site::ALL, limit).await
        }
        Commands::Stats => {
            for site in Site::ALL {
                let conn = db::connect(site)?;
                db::init_schema(&conn)?;
                let s = db::get_stats(&conn)?;
                println!("[{}]", site.name());
                println!("  Total:     {}", s.total);
                println!("  Visited:   {}", s.visited);
                println!("  Unvisited: {}", s.unvisited);
                println!("  Entries:   {}", s.entries);
                println!("  Errors:    {}", s.errors);
            }
            Ok(())
        }
        Commands::Overview { limit, site } => {
            for site in selected(site) {
                let conn = db::connect(site)?;
                db::init_schema(&conn)?;
                let rows = db::fetch_overview(&conn, limit)?;
                if rows.is_empty() {
                    println!("{}: no entries stored.", site.name());
                    continue;
                }

                println!("[{}]", site.name());
                println!(
                    "{:>4} | {:<44} | {:>4} | {:>8} | {:>8}",
                    "#", "Title", "TOC", "Body", "Bibl"
                );
                println!("{}", "-".repeat(80));
                for r in &rows {
                    let toc_items = serde_json::from_str::<Vec<TocNode>>(&r.contents)
                        .map(|nodes| nodes.len())
                        .unwrap_or(0);
                    println!(
                        "{:>4} | {:<44} | {:>4} | {:>8} | {:>8}",
                        r.id,
                        truncate(&r.title, 44),
                        toc_items,
                        r.body_chars,
                        r.bibliography_chars
                    );
                }
            }
            Ok(())
        }
        Commands::ExportCsv { out } => {
            let conns = open_all()?;
            let count = export::export_csv(&conns, &out)?;
            println!("Wrote {} rows to {}", count, out.display());
            Ok(())
        }
        Commands::ExportJson { out } => {
            let conns = open_all()?;
            let count = export::export_json(&conns, &out)?;
            println!("Wrote {} entries to {}", count, out.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn selected(site: Option<Site>) -> Vec<Site> {
    match site {
        Some(s) => vec![s],
        None => Site::ALL.to_vec(),
    }
}

fn open_all() -> Result<Vec<rusqlite::Connection>> {
    Site::ALL
        .iter()
        .map(|&site| {
            let conn = db::connect(site)?;
            db::init_schema(&conn)?;
            Ok(conn)
        })
        .collect()
}

struct ScrapeStats {
    total: usize,
    ok: usize,
    errors: usize,
}

/// Run one worker per site concurrently; inside a worker the
/// fetch-extract-persist loop is strictly sequential.
async fn scrape_sites(sites: &[Site], limit: Option<usize>) -> Result<()> {
    let multi = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{prefix:>4} [{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
        .progress_chars("=> ");

    let mut handles = Vec::new();
    for &site in sites {
        let pb = multi.add(ProgressBar::new(0));
        pb.set_style(style.clone());
        pb.set_prefix(site.name());
        handles.push((site, tokio::spawn(scrape_site(site, limit, pb))));
    }

    for (site, handle) in handles {
        match handle.await? {
            Ok(stats) => println!(
                "{}: {} scraped ({} ok, {} errors).",
                site.name(),
                stats.total,
                stats.ok,
                stats.errors
            ),
            Err(e) => warn!("{}: worker failed: {:#}", site.name(), e),
        }
    }
    Ok(())
}

async fn scrape_site(
    site: Site,
    limit: Option<usize>,
    pb: ProgressBar,
) -> Result<ScrapeStats> {
    let conn = db::connect(site)?;
    db::init_schema(&conn)?;
    let fetcher = Fetcher::new()?;

    let pages = db::fetch_unvisited(&conn, limit)?;
    pb.set_length(pages.len() as u64);

    let mut ok = 0usize;
    let mut errors = 0usize;

    for (page_id, uri) in pages {
        let html_body = fetcher.get_text(&uri).await?;

        match site.extract_entry(&html_body) {
            Ok(fields) => {
                let row = db::EntryRow {
                    uri: uri.clone(),
                    title: fields.title,
                    abstract_text: fields.abstract_text,
                    contents: serde_json::to_string(&fields.contents)?,
                    body: fields.body,
                    bibliography: fields.bibliography,
                };
                db::save_entry(&conn, page_id, &row)?;
                ok += 1;
            }
            Err(e) => {
                warn!("{}: skipping {}: {}", site.name(), uri, e);
                db::mark_failed(&conn, page_id, &e.to_string())?;
                errors += 1;
            }
        }

        pb.inc(1);
        tokio::time::sleep(PAGE_DELAY).await;
    }

    pb.finish_and_clear();
    Ok(ScrapeStats {
        total: ok + errors,
        ok,
        errors,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
