use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use reckon_core::{OutputFormat, ReckonConfig, Role};
use reckon_gitsignal::engineer::email_prefix;
use reckon_gitsignal::{EngineerAnalysis, GitMetrics};
use reckon_scan::ScanOptions;

const DEFAULT_CONFIG: &str = r#"# reckon configuration

[git]
# Months of history to analyze for git signals
window_months = 6
# Files untouched for this many months count as stable core
stable_months = 18
# Use bi-weekly display buckets instead of weekly
smooth = false

[engineer]
# Months of history for engineer throughput analysis
period_months = 6
# Industry-average senior engineer output
baseline_loc_per_day = 80.0
# Weekend and PTO de-rating applied to active days
workday_factor = 0.71

[scan]
# Skip files larger than this many bytes
max_file_size = 1048576
"#;

#[derive(Parser)]
#[command(
    name = "reckon",
    version,
    about = "Repository cost signals from git history",
    long_about = "Reckon mines a repository's git history for the signals that drive cost\n\
                   and schedule estimates: churn concentration, stability, ownership risk,\n\
                   parallelism, and per-contributor throughput.\n\n\
                   Examples:\n  \
                     reckon signals                  Analyze the current repository\n  \
                     reckon signals --since 12       Look back twelve months\n  \
                     reckon signals --format json    Machine-readable output\n  \
                     reckon engineers                Per-contributor throughput\n  \
                     reckon init                     Write a default .reckon.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .reckon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and sparklines (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze git history for churn, stability, and ownership signals
    #[command(long_about = "Analyze git history for churn, stability, and ownership signals.\n\n\
        Scans the working tree for a path→LOC/role inventory, parses the git log\n\
        once, and reports churn concentration, stable-core and volatile-surface\n\
        fractions, rewrite pressure, ownership concentration, parallelism, per-role\n\
        churn sparklines, and the net effort adjustment.\n\n\
        Examples:\n  reckon signals\n  reckon signals --path ../service --since 12 --smooth")]
    Signals {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Months of history to analyze (default: from config)
        #[arg(long)]
        since: Option<u32>,

        /// Use bi-weekly sparkline buckets instead of weekly
        #[arg(long)]
        smooth: bool,

        /// Sparkline width in terminal output (default: 40)
        #[arg(long, default_value = "40")]
        width: usize,
    },
    /// Analyze per-contributor throughput
    #[command(long_about = "Analyze per-contributor throughput.\n\n\
        Parses git history with raw author identities preserved and reports each\n\
        contributor's LOC/day against a fixed baseline, their multiplier, and the\n\
        share of commits carrying explicit AI-assistance markers.\n\n\
        Examples:\n  reckon engineers\n  reckon engineers --since 3 --format json")]
    Engineers {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Months of history to analyze (default: from config)
        #[arg(long)]
        since: Option<u32>,
    },
    /// Write a default .reckon.toml configuration file
    Init,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReckonConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = Path::new(".reckon.toml");
            if default_path.exists() {
                ReckonConfig::from_file(default_path).into_diagnostic()?
            } else {
                ReckonConfig::default()
            }
        }
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "window: {} months, stable cutoff: {} months",
            config.git.window_months, config.git.stable_months
        );
    }

    match cli.command {
        Command::Signals {
            ref path,
            since,
            smooth,
            width,
        } => {
            ensure_repository(path)?;

            let records = reckon_scan::scan_repository(
                path,
                &ScanOptions {
                    max_file_size: config.scan.max_file_size,
                },
            )
            .into_diagnostic()?;

            let options = reckon_gitsignal::Options {
                window_months: since.unwrap_or(config.git.window_months),
                stable_months: config.git.stable_months,
                smooth: smooth || config.git.smooth,
                preserve_authors: false,
            };

            if cli.verbose {
                eprintln!(
                    "Scanned {} files; analyzing {} months of history...",
                    records.len(),
                    options.window_months
                );
            }

            // a git failure degrades to a scan-only report, never a hard exit
            let metrics = match reckon_gitsignal::analyze(path, &records, &options) {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    eprintln!("warning: git analysis skipped: {e}");
                    None
                }
            };

            let summary = ScanSummary::from_records(&records);
            match cli.format {
                OutputFormat::Text => render_signals_text(&summary, metrics.as_ref(), width),
                OutputFormat::Json => render_signals_json(&summary, metrics.as_ref())?,
                OutputFormat::Markdown => render_signals_markdown(&summary, metrics.as_ref()),
            }
        }
        Command::Engineers { ref path, since } => {
            ensure_repository(path)?;

            let records = reckon_scan::scan_repository(
                path,
                &ScanOptions {
                    max_file_size: config.scan.max_file_size,
                },
            )
            .into_diagnostic()?;

            let options = reckon_gitsignal::EngineerOptions {
                period_months: since.unwrap_or(config.engineer.period_months),
                baseline_loc_per_day: config.engineer.baseline_loc_per_day,
                workday_factor: config.engineer.workday_factor,
            };

            let analysis = reckon_gitsignal::analyze_throughput(path, &records, &options)
                .into_diagnostic()?;
            let Some(analysis) = analysis else {
                miette::bail!(
                    "no engineer data available (requires git history with identifiable authors)"
                );
            };

            match cli.format {
                OutputFormat::Text => render_engineers_text(&analysis),
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&analysis).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => render_engineers_markdown(&analysis),
            }
        }
        Command::Init => {
            let path = Path::new(".reckon.toml");
            if path.exists() {
                miette::bail!(".reckon.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .reckon.toml with default configuration");
        }
    }

    Ok(())
}

fn ensure_repository(path: &Path) -> Result<()> {
    if reckon_gitsignal::detect_repo(path).is_none() && git2::Repository::discover(path).is_err() {
        miette::bail!(miette::miette!(
            help = "Run reckon from inside a git repository, or specify --path to one",
            "Not a git repository: {}",
            path.display()
        ));
    }
    Ok(())
}

struct ScanSummary {
    files: usize,
    total_loc: u64,
    core_loc: u64,
    test_loc: u64,
}

impl ScanSummary {
    fn from_records(records: &[reckon_core::FileRecord]) -> Self {
        let mut summary = ScanSummary {
            files: records.len(),
            total_loc: 0,
            core_loc: 0,
            test_loc: 0,
        };
        for record in records {
            summary.total_loc += record.loc;
            match record.role {
                Role::Core => summary.core_loc += record.loc,
                Role::Test => summary.test_loc += record.loc,
                _ => {}
            }
        }
        summary
    }
}

fn render_signals_text(summary: &ScanSummary, metrics: Option<&GitMetrics>, width: usize) {
    println!(
        "Scanned {} files: {} LOC ({} core, {} test)",
        summary.files, summary.total_loc, summary.core_loc, summary.test_loc
    );

    let Some(m) = metrics else {
        println!("Git signals unavailable.");
        return;
    };

    println!(
        "\nGit signals (last {} months, {} commits):",
        m.window_months, m.commit_count
    );
    println!("{:-<72}", "");
    println!(
        "  Churn concentration:     {:.1}% of files absorb {:.1}% of edits",
        m.churn_concentration.file_percent, m.churn_concentration.edit_percent
    );
    println!(
        "  Stable core:             {:.1}% of LOC",
        m.stable_core * 100.0
    );
    println!(
        "  Volatile surface:        {:.1}% of LOC",
        m.volatile_surface * 100.0
    );
    println!("  Rewrite pressure:        {:.2}", m.rewrite_pressure);
    println!("  Ownership concentration: {:.2}", m.ownership_concentration);
    println!("  Parallelism:             {}", m.parallelism);
    if let Some(note) = &m.analysis_note {
        println!("  Note: {note}");
    }

    println!("\n  Churn by role:");
    for (role, spark) in &m.churn_series {
        println!(
            "    {:<7} {}",
            role.to_string(),
            reckon_gitsignal::render_adaptive(&spark.values, width)
        );
    }
    if let Some(timeline) = &m.ai_timeline {
        println!("    {:<7} {}", "ai", timeline);
    }

    println!("\n  Effort adjustments:");
    if m.adjustments.is_empty() {
        println!("    none matched");
    } else {
        for adj in &m.adjustments {
            println!("    {:+.2}  {}", adj.adjustment, adj.reason);
        }
    }
    println!("    net: {:+.2}", m.net_adjustment);
}

fn render_signals_json(summary: &ScanSummary, metrics: Option<&GitMetrics>) -> Result<()> {
    let mut json = serde_json::Map::new();
    json.insert(
        "summary".into(),
        serde_json::json!({
            "files": summary.files,
            "totalLoc": summary.total_loc,
            "coreLoc": summary.core_loc,
            "testLoc": summary.test_loc,
        }),
    );
    if let Some(m) = metrics {
        json.insert("git".into(), serde_json::to_value(m).into_diagnostic()?);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(json)).into_diagnostic()?
    );
    Ok(())
}

fn render_signals_markdown(summary: &ScanSummary, metrics: Option<&GitMetrics>) {
    println!("# Repository Signals\n");
    println!(
        "**Files:** {} · **LOC:** {} ({} core, {} test)\n",
        summary.files, summary.total_loc, summary.core_loc, summary.test_loc
    );

    let Some(m) = metrics else {
        println!("_Git signals unavailable._");
        return;
    };

    println!("## Git Signals\n");
    println!(
        "- **Window:** last {} months ({} commits)",
        m.window_months, m.commit_count
    );
    println!(
        "- **Churn concentration:** {:.1}% of files → {:.1}% of edits",
        m.churn_concentration.file_percent, m.churn_concentration.edit_percent
    );
    println!("- **Stable core:** {:.1}%", m.stable_core * 100.0);
    println!("- **Volatile surface:** {:.1}%", m.volatile_surface * 100.0);
    println!("- **Rewrite pressure:** {:.2}", m.rewrite_pressure);
    println!(
        "- **Ownership concentration:** {:.2}",
        m.ownership_concentration
    );
    println!("- **Parallelism:** {}\n", m.parallelism);

    println!("## Churn by Role\n");
    for (role, spark) in &m.churn_series {
        println!("- `{}` {}", role, spark.glyphs);
    }
    println!();

    println!("## Effort Adjustments\n");
    if m.adjustments.is_empty() {
        println!("No rules matched.\n");
    } else {
        println!("| Rule | Delta |");
        println!("|------|-------|");
        for adj in &m.adjustments {
            println!("| {} | {:+.2} |", adj.reason, adj.adjustment);
        }
        println!();
    }
    println!("**Net adjustment:** {:+.2}", m.net_adjustment);
}

fn render_engineers_text(analysis: &EngineerAnalysis) {
    println!(
        "Engineer throughput (last {} months, baseline {} LOC/day):",
        analysis.period_months, analysis.baseline_loc_per_day
    );
    println!("{:-<72}", "");
    for engineer in &analysis.engineers {
        println!(
            "  {:<18} {:>8} LOC  {:>7.1}/day  {:>5.2}x  ai {:>3.0}%  {} commits",
            email_prefix(&engineer.author_email),
            engineer.total_loc,
            engineer.loc_per_day,
            engineer.multiplier,
            engineer.ai_percent * 100.0,
            engineer.commit_count,
        );
    }
    println!(
        "\n  Median multiplier: {:.2}x across {} contributors",
        analysis.median_multiplier,
        analysis.engineers.len()
    );
    println!("  Caveat: {}", analysis.caveat);
}

fn render_engineers_markdown(analysis: &EngineerAnalysis) {
    println!("# Engineer Throughput\n");
    println!(
        "**Window:** last {} months · **Baseline:** {} LOC/day\n",
        analysis.period_months, analysis.baseline_loc_per_day
    );
    println!("| Engineer | LOC | LOC/day | Multiplier | AI | Commits |");
    println!("|----------|-----|---------|------------|----|---------|");
    for engineer in &analysis.engineers {
        println!(
            "| {} | {} | {:.1} | {:.2}x | {:.0}% | {} |",
            email_prefix(&engineer.author_email),
            engineer.total_loc,
            engineer.loc_per_day,
            engineer.multiplier,
            engineer.ai_percent * 100.0,
            engineer.commit_count,
        );
    }
    println!(
        "\n**Median multiplier:** {:.2}x\n\n_{}_",
        analysis.median_multiplier, analysis.caveat
    );
}
