use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use serde_json::Value;

mod api;
mod chart;
mod coerce;
mod config;
mod fields;
mod grade;
mod history;
mod models;
mod normalize;
mod referral;
mod report;
mod state;
mod users;

use api::{ApiClient, ApiError};
use config::{Config, ConnectionArgs};
use history::{BottleneckFilter, HistoryBook, RateBand, ReferralFilter};
use report::call::CallTab;
use report::referral::ReferralTab;
use state::{Action, AppState};

#[derive(Parser)]
#[command(name = "crm-insight")]
#[command(about = "Call and referral analytics client for the CRM analysis backend", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RateArg {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, ValueEnum)]
enum BottleneckArg {
    With,
    Without,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a call export and render its analysis
    Analyze {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "call-report.html")]
        out: PathBuf,
    },
    /// Upload a referral export and render its analysis
    AnalyzeReferral {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "referral-report.html")]
        out: PathBuf,
    },
    /// List saved call analyses
    History {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a saved call analysis
    Show {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value = "call-report.html")]
        out: PathBuf,
    },
    /// Render the most recent call analysis
    Latest {
        #[arg(long, default_value = "call-report.html")]
        out: PathBuf,
    },
    /// Delete a saved call analysis
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Per-user performance breakdown
    #[command(group(
        ArgGroup::new("source")
            .args(["file", "id", "input"])
            .required(true)
            .multiple(false)
    ))]
    Users {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        id: Option<i64>,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = "users-report.html")]
        out: PathBuf,
    },
    /// List saved referral analyses
    ReferralHistory {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        rate: Option<RateArg>,
        #[arg(long, value_enum)]
        bottleneck: Option<BottleneckArg>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a saved referral analysis
    ReferralShow {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value = "referral-report.html")]
        out: PathBuf,
    },
    /// Delete a saved referral analysis
    ReferralDelete {
        #[arg(long)]
        id: i64,
    },
    /// Download the spreadsheet report of a referral analysis
    ReferralReport {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Download every referral analysis as one spreadsheet
    ReferralExport {
        #[arg(long)]
        out: PathBuf,
    },
    /// Download the originally uploaded file of an analysis
    Download {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the canonical form of a call-analysis JSON file
    Normalize {
        #[arg(long)]
        input: PathBuf,
    },
    /// Render a local analysis JSON file without contacting the backend
    Render {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        referral: bool,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
    },
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Runs a backend request through the page's navigation so stale results are discarded.
async fn fetch<T, F>(state: &AppState, request: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Send + 'static,
{
    match state.navigation.run(request).await {
        Some(result) => Ok(result?),
        None => bail!("request was cancelled before it completed"),
    }
}

fn render_call(state: &mut AppState, payload: Value, out: &Path) -> anyhow::Result<()> {
    let analysis = normalize::normalize(payload).context("analysis payload is not an object")?;
    println!(
        "Overall score {} ({}), success rate {}.",
        report::fmt_num(analysis.scores.overall),
        grade::ScoreBadge::classify(analysis.scores.overall).label(),
        grade::percent_label(analysis.statistics.success_rate())
    );
    let html = report::call::render_call_report(&analysis);
    state.set_call(analysis);
    if let Some(handles) = state.show_call_tab(CallTab::Overview) {
        log::debug!(
            "{} of {} charts live, {} disposed",
            handles.len(),
            state.charts.live().len(),
            state.charts.disposed_count()
        );
    }
    report::write_document(out, &html)?;
    println!("Report written to {}.", out.display());
    Ok(())
}

fn render_referral(state: &mut AppState, payload: &Value, out: &Path) -> anyhow::Result<()> {
    let analysis =
        referral::normalize_referral(payload).context("referral payload is not an object")?;
    println!(
        "{} referrals, {} pending, {} completed.",
        analysis.status.total(),
        grade::percent_label(analysis.status.percent_pending),
        grade::percent_label(analysis.status.percent_completed)
    );
    let html = report::referral::render_referral_report(&analysis);
    state.set_referral(analysis);
    if let Some(handles) = state.show_referral_tab(ReferralTab::Overview) {
        log::debug!(
            "{} of {} charts live, {} disposed",
            handles.len(),
            state.charts.live().len(),
            state.charts.disposed_count()
        );
    }
    report::write_document(out, &html)?;
    println!("Report written to {}.", out.display());
    Ok(())
}

fn write_bytes(out: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Saved {} bytes to {}.", bytes.len(), out.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_args(&cli.connection)?;
    let client = ApiClient::new(&config).context("failed to build HTTP client")?;
    let mut state = AppState::default();

    match cli.command {
        Commands::Analyze { file, out } => {
            let Some(_busy) = state.actions.try_begin(Action::AnalyzeCall) else {
                bail!("an analysis is already running");
            };
            let api = client.clone();
            let payload = fetch(&state, async move { api.analyze_call_file(&file).await }).await?;
            render_call(&mut state, payload, &out)?;
        }
        Commands::AnalyzeReferral { file, out } => {
            let Some(_busy) = state.actions.try_begin(Action::AnalyzeReferral) else {
                bail!("a referral analysis is already running");
            };
            let api = client.clone();
            let payload =
                fetch(&state, async move { api.analyze_referral_file(&file).await }).await?;
            render_referral(&mut state, &payload, &out)?;
        }
        Commands::History { page, csv, out } => {
            let api = client.clone();
            let rows = fetch(&state, async move { api.history().await }).await?;
            if let Some(path) = &csv {
                history::write_csv(path, &rows)?;
                println!("Exported {} rows to {}.", rows.len(), path.display());
            }
            if let Some(path) = &out {
                report::write_document(path, &report::history::render_call_history(&rows))?;
            }
            let mut book = HistoryBook::new(rows, config.page_size);
            if !book.set_page(page) && page != 1 {
                log::warn!("page {page} is out of range, showing page {}", book.page());
            }
            let current = book.current();
            for row in current.rows {
                println!(
                    "- #{} {} [{}] score {} ({}), seller {}",
                    row.id,
                    row.file_name.as_deref().unwrap_or("—"),
                    report::history::format_timestamp(row.analyzed_at),
                    report::fmt_num(row.score_total),
                    grade::ScoreBadge::classify(row.score_total).label(),
                    row.seller_name.as_deref().unwrap_or("—")
                );
            }
            println!("{}{}", current.label(), report::history::page_hint(&current));
        }
        Commands::Show { id, out } => {
            let api = client.clone();
            let payload = fetch(&state, async move { api.analysis(id).await }).await?;
            render_call(&mut state, payload, &out)?;
        }
        Commands::Latest { out } => {
            let api = client.clone();
            let payload = fetch(&state, async move { api.latest_analysis().await }).await?;
            render_call(&mut state, payload, &out)?;
        }
        Commands::Delete { id } => {
            let api = client.clone();
            let rows = fetch(&state, async move { api.analysis_history().await }).await?;
            let mut book = HistoryBook::new(rows, config.page_size);
            book.delete(&state.actions, id, |id| client.delete_analysis(id))
                .await
                .with_context(|| format!("failed to delete analysis {id}"))?;
            println!("Deleted analysis {id}; {} remain.", book.rows().len());
        }
        Commands::Users {
            file,
            id,
            input,
            user,
            out,
        } => {
            let payload = match (file, id, input) {
                (Some(file), _, _) => {
                    let api = client.clone();
                    fetch(&state, async move { api.analyze_call_file(&file).await }).await?
                }
                (_, Some(id), _) => {
                    let api = client.clone();
                    fetch(&state, async move { api.analysis(id).await }).await?
                }
                (_, _, Some(input)) => read_json(&input)?,
                _ => bail!("one of --file, --id or --input is required"),
            };
            let analysis =
                normalize::normalize(payload).context("analysis payload is not an object")?;
            state.set_call(analysis);
            if let Some(name) = &user {
                if state.select_user(name).is_none() {
                    log::warn!("user {name} was not found in the roster");
                }
            }
            let (Some(analysis), Some(roster)) = (&state.call, &state.roster) else {
                bail!("no analysis loaded");
            };
            println!(
                "{} users from {:?}{}.",
                roster.users.len(),
                roster.source,
                if roster.counts_unknown {
                    ", some call counts unknown"
                } else {
                    ""
                }
            );
            for user in roster.ranked() {
                println!("- {}: {} calls", user.name, user.call_count);
            }
            let html = report::users::render_users_report(
                analysis,
                roster,
                state.selected_user.as_deref(),
            );
            report::write_document(&out, &html)?;
            println!("Report written to {}.", out.display());
        }
        Commands::ReferralHistory {
            search,
            rate,
            bottleneck,
            from,
            to,
            page,
            csv,
            out,
        } => {
            let filter = ReferralFilter {
                search,
                rate: rate.map(|rate| match rate {
                    RateArg::High => RateBand::High,
                    RateArg::Medium => RateBand::Medium,
                    RateArg::Low => RateBand::Low,
                }),
                bottleneck: bottleneck.map(|bottleneck| match bottleneck {
                    BottleneckArg::With => BottleneckFilter::With,
                    BottleneckArg::Without => BottleneckFilter::Without,
                }),
                from,
                to,
            };
            let api = client.clone();
            let entries = fetch(&state, async move { api.referral_history().await }).await?;
            let overall = history::referral_overall(&entries);
            println!(
                "{} analyses, {} referrals, {} completed, {} pending, top bottleneck {}.",
                overall.analyses,
                overall.referrals,
                overall.completed,
                overall.pending,
                overall.top_bottleneck.as_deref().unwrap_or("—")
            );

            let filtered: Vec<_> = filter.apply(&entries).into_iter().cloned().collect();
            if let Some(path) = &csv {
                history::write_csv(path, &filtered)?;
                println!("Exported {} rows to {}.", filtered.len(), path.display());
            }
            if let Some(path) = &out {
                let html = report::history::render_referral_history(
                    &entries,
                    &filter,
                    page,
                    config.page_size,
                );
                report::write_document(path, &html)?;
            }
            let mut book = HistoryBook::new(filtered, config.page_size);
            if !book.set_page(page) && page != 1 {
                log::warn!("page {page} is out of range, showing page {}", book.page());
            }
            let current = book.current();
            for entry in current.rows {
                println!(
                    "- #{} {} [{}] completion {}, bottleneck {}, risks {}",
                    entry.id,
                    entry.file_name,
                    report::history::format_timestamp(entry.analyzed_at),
                    grade::percent_label(entry.completion_rate),
                    entry.bottleneck_unit.as_deref().unwrap_or("—"),
                    entry.risk_count
                );
            }
            println!("{}{}", current.label(), report::history::page_hint(&current));
        }
        Commands::ReferralShow { id, out } => {
            let api = client.clone();
            let payload = fetch(&state, async move { api.referral_analysis(id).await }).await?;
            render_referral(&mut state, &payload, &out)?;
        }
        Commands::ReferralDelete { id } => {
            let api = client.clone();
            let entries = fetch(&state, async move { api.referral_history().await }).await?;
            let mut book = HistoryBook::new(entries, config.page_size);
            book.delete(&state.actions, id, |id| client.delete_referral_analysis(id))
                .await
                .with_context(|| format!("failed to delete referral analysis {id}"))?;
            println!("Deleted referral analysis {id}; {} remain.", book.rows().len());
        }
        Commands::ReferralReport { id, out } => {
            let api = client.clone();
            let bytes = fetch(&state, async move { api.referral_report(id).await }).await?;
            write_bytes(&out, &bytes)?;
        }
        Commands::ReferralExport { out } => {
            let api = client.clone();
            let bytes = fetch(&state, async move { api.referral_export_all().await }).await?;
            write_bytes(&out, &bytes)?;
        }
        Commands::Download { id, out } => {
            let api = client.clone();
            let bytes = fetch(&state, async move { api.original_file(id).await }).await?;
            write_bytes(&out, &bytes)?;
        }
        Commands::Normalize { input } => {
            let canonical = normalize::to_canonical(read_json(&input)?)
                .context("analysis payload is not an object")?;
            println!("{}", serde_json::to_string_pretty(&canonical)?);
        }
        Commands::Render {
            input,
            referral,
            out,
        } => {
            let payload = api::unwrap_full_analysis(read_json(&input)?)?;
            if referral {
                render_referral(&mut state, &payload, &out)?;
            } else {
                render_call(&mut state, payload, &out)?;
            }
        }
    }

    Ok(())
}
