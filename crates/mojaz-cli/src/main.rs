mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use mojaz_ai::{
    AnalysisBackend, AnalyzerConfig, BatchItem, MAX_EVIDENCE_IMAGES, ObjectionAnalyzer,
};
use mojaz_core::{
    DEFAULT_STORE_FILE, NewObjection, Objection, ObjectionStore, QueueView, Resolution,
    ResolutionFilter, ViolationType,
};
use mojaz_remote::gemini::{DEFAULT_TEXT_URL, DEFAULT_VISION_URL};
use mojaz_remote::{GeminiClient, GeminiConfig, ProxyClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Mojaz: score, queue and review traffic-violation objections.
#[derive(Parser, Debug)]
#[command(name = "mojaz", version, about)]
struct Cli {
    /// Objection store file.
    #[arg(long, env = "MOJAZ_STORE", default_value = DEFAULT_STORE_FILE, global = true)]
    store: PathBuf,

    /// Base URL of an analysis proxy serving /api/analyze.
    #[arg(long, env = "MOJAZ_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Gemini API key. Takes precedence over --endpoint.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_key: Option<String>,

    #[arg(long, env = "GEMINI_TEXT_URL", default_value = DEFAULT_TEXT_URL, hide = true)]
    gemini_text_url: String,

    #[arg(long, env = "GEMINI_VISION_URL", default_value = DEFAULT_VISION_URL, hide = true)]
    gemini_vision_url: String,

    /// Upper bound on each remote call, in seconds.
    #[arg(long, env = "MOJAZ_TIMEOUT_SECS", default_value_t = 20, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify and file a new objection.
    Submit {
        /// Violation label or slug (e.g. speeding, parking, seat-belt).
        #[arg(long)]
        violation: ViolationType,
        /// Objection text.
        #[arg(long)]
        text: String,
        /// Evidence item name. Defaults to the image file names.
        #[arg(long)]
        evidence: Vec<String>,
        /// Evidence image; the first one is scored.
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Classify an objection text without storing it.
    Classify {
        #[arg(long)]
        violation: ViolationType,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 0)]
        attachments: u32,
    },
    /// Show the pending queue, or processed objections.
    List {
        #[arg(long)]
        processed: bool,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Order by priority instead of arrival.
        #[arg(long)]
        sorted: bool,
    },
    /// Re-analyse every stored objection and re-rank the queue.
    AnalyzeAll,
    /// Record a staff decision.
    Resolve {
        id: String,
        #[arg(value_enum)]
        decision: Decision,
    },
    /// Reject every pending low-priority objection.
    AutoReject,
    /// Show queue statistics.
    Stats,
    /// Remove every stored objection.
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Approved,
    Rejected,
}

impl From<FilterArg> for ResolutionFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::All => ResolutionFilter::All,
            FilterArg::Approved => ResolutionFilter::Approved,
            FilterArg::Rejected => ResolutionFilter::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for Resolution {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Approve => Resolution::Approved,
            Decision::Reject => Resolution::Rejected,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let analyzer = build_analyzer(&cli);

    match cli.command {
        Command::Submit {
            violation,
            text,
            evidence,
            images,
            plate,
            location,
        } => {
            let mut store = load_store(&cli.store)?;
            let submission = NewObjection {
                plate_number: plate,
                location,
                ..NewObjection::new(violation, text).with_evidence(evidence)
            };
            let obj = cmd_submit(&analyzer, &mut store, submission, &images).await?;
            display::print_objection_card(&obj);
            save_store(&store, &cli.store)?;
        }
        Command::Classify {
            violation,
            text,
            attachments,
        } => {
            let result = analyzer.analyze(&text, violation, attachments, &[]).await;
            display::print_analysis(&result);
        }
        Command::List {
            processed,
            filter,
            sorted,
        } => {
            let store = load_store(&cli.store)?;
            if processed {
                let items = store.processed(filter.into());
                display::print_queue("Processed", &items);
            } else {
                let mut view =
                    QueueView::new(store.pending().into_iter().cloned().collect());
                if sorted {
                    view.toggle_sort();
                }
                let items: Vec<&Objection> = view.items().iter().collect();
                display::print_queue("Pending", &items);
            }
        }
        Command::AnalyzeAll => {
            let mut store = load_store(&cli.store)?;
            let ranked = cmd_analyze_all(&analyzer, &mut store).await?;
            let items: Vec<&Objection> = ranked.items().iter().collect();
            display::print_queue("Pending by priority", &items);
            save_store(&store, &cli.store)?;
        }
        Command::Resolve { id, decision } => {
            let mut store = load_store(&cli.store)?;
            store
                .resolve(&id, decision.into())
                .with_context(|| format!("resolving {id}"))?;
            if let Some(obj) = store.get(&id) {
                display::print_objection_card(obj);
            }
            save_store(&store, &cli.store)?;
        }
        Command::AutoReject => {
            let mut store = load_store(&cli.store)?;
            let report = store.auto_reject();
            display::print_auto_reject(&report);
            save_store(&store, &cli.store)?;
        }
        Command::Stats => {
            let store = load_store(&cli.store)?;
            display::print_stats(&store.stats(Local::now().date_naive()));
        }
        Command::Clear => {
            cmd_clear(&cli.store)?;
            println!("Cleared {}", cli.store.display());
        }
    }

    Ok(())
}

/// Gemini key first, then proxy endpoint, else keyword-only.
fn build_analyzer(cli: &Cli) -> ObjectionAnalyzer {
    let config = AnalyzerConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let backend: Option<Arc<dyn AnalysisBackend>> = if let Some(key) = &cli.gemini_key {
        Some(Arc::new(GeminiClient::new(GeminiConfig {
            api_key: key.clone(),
            text_url: cli.gemini_text_url.clone(),
            vision_url: cli.gemini_vision_url.clone(),
        })))
    } else {
        cli.endpoint
            .as_ref()
            .map(|url| Arc::new(ProxyClient::new(url.clone())) as Arc<dyn AnalysisBackend>)
    };

    match backend {
        Some(backend) => {
            info!(backend = backend.name(), timeout_secs = cli.timeout_secs, "remote analysis enabled");
            ObjectionAnalyzer::new(backend, config)
        }
        None => {
            info!("no remote backend configured, using keyword classifier");
            ObjectionAnalyzer::offline()
        }
    }
}

/// Classify a submission (scoring the first image) and file it.
async fn cmd_submit(
    analyzer: &ObjectionAnalyzer,
    store: &mut ObjectionStore,
    mut submission: NewObjection,
    images: &[PathBuf],
) -> Result<Objection> {
    ensure!(
        !submission.description.trim().is_empty(),
        "objection text is empty"
    );
    ensure!(
        images.len() <= MAX_EVIDENCE_IMAGES,
        "at most {MAX_EVIDENCE_IMAGES} images may be attached, got {}",
        images.len()
    );

    let mut image_bytes = Vec::with_capacity(images.len());
    for path in images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading image {}", path.display()))?;
        image_bytes.push(bytes);
    }

    if submission.evidence.is_empty() {
        submission.evidence = images.iter().map(|p| evidence_name(p)).collect();
    }

    let result = analyzer
        .analyze(
            &submission.description,
            submission.violation_type,
            submission.evidence.len() as u32,
            &image_bytes,
        )
        .await;
    display::print_analysis(&result);

    Ok(store.submit(submission, result.priority, Utc::now()).clone())
}

/// Re-analyse every stored objection. The store keeps its arrival order; the
/// returned view holds the pending queue re-ranked by the new priorities.
async fn cmd_analyze_all(
    analyzer: &ObjectionAnalyzer,
    store: &mut ObjectionStore,
) -> Result<QueueView> {
    let items: Vec<BatchItem> = store.iter().map(BatchItem::from).collect();
    let results = analyzer
        .analyze_batch(&items)
        .await
        .context("batch analysis")?;
    let changed = store.apply_analysis(&results);
    println!(
        "Analysed {} objection(s), {} priority change(s)",
        results.len(),
        changed
    );

    let mut view = QueueView::new(store.pending().into_iter().cloned().collect());
    view.rerank(&results);
    Ok(view)
}

/// Empty the store file. An unreadable file is replaced rather than parsed.
fn cmd_clear(path: &Path) -> Result<()> {
    let mut store = ObjectionStore::load(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "store unreadable, replacing it");
        ObjectionStore::new()
    });
    store.clear();
    save_store(&store, path)
}

fn evidence_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_store(path: &Path) -> Result<ObjectionStore> {
    ObjectionStore::load(path).with_context(|| format!("loading store {}", path.display()))
}

fn save_store(store: &ObjectionStore, path: &Path) -> Result<()> {
    store
        .save(path)
        .with_context(|| format!("saving store {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojaz_core::Priority;

    #[test]
    fn parses_submit_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "mojaz",
            "submit",
            "--violation",
            "parking",
            "--text",
            "كنت أنزل راكباً",
            "--image",
            "a.jpg",
            "--image",
            "b.png",
            "--plate",
            "ABC 1234",
        ])
        .unwrap();
        match cli.command {
            Command::Submit {
                violation,
                images,
                evidence,
                plate,
                ..
            } => {
                assert_eq!(violation, ViolationType::IrregularParking);
                assert_eq!(images.len(), 2);
                assert!(evidence.is_empty());
                assert_eq!(plate.as_deref(), Some("ABC 1234"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_violation() {
        assert!(
            Cli::try_parse_from(["mojaz", "classify", "--violation", "jaywalking", "--text", "x"])
                .is_err()
        );
    }

    #[test]
    fn parses_resolve_and_list_filter() {
        let cli = Cli::try_parse_from(["mojaz", "resolve", "OBJ-1", "reject"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Resolve { ref id, decision: Decision::Reject } if id == "OBJ-1"
        ));

        let cli =
            Cli::try_parse_from(["mojaz", "list", "--processed", "--filter", "approved"]).unwrap();
        match cli.command {
            Command::List {
                processed, filter, ..
            } => {
                assert!(processed);
                assert_eq!(ResolutionFilter::from(filter), ResolutionFilter::Approved);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn evidence_name_uses_file_name() {
        assert_eq!(evidence_name(Path::new("/tmp/receipt.jpg")), "receipt.jpg");
    }

    #[tokio::test]
    async fn submit_defaults_evidence_to_image_names() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.jpg");
        std::fs::write(&image, [0xFF, 0xD8, 0xFF]).unwrap();

        let mut store = ObjectionStore::new();
        let submission = NewObjection {
            location: Some("الرياض".into()),
            ..NewObjection::new(ViolationType::Speeding, "أرجو الإلغاء")
        };
        let obj = cmd_submit(&ObjectionAnalyzer::offline(), &mut store, submission, &[image])
            .await
            .unwrap();

        assert_eq!(obj.evidence(), ["receipt.jpg".to_string()]);
        assert_eq!(obj.location(), Some("الرياض"));
        // One attachment counts as evidence for the keyword classifier.
        assert_eq!(obj.priority(), Priority::Medium);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn analyze_all_ranks_view_but_keeps_store_order() {
        let mut store = ObjectionStore::new();
        let now = Utc::now();
        // Offline analysis: "أرجو الإلغاء" is low, "رقم اللوحة خاطئ وأرفقت صورة" is high.
        let strong = store
            .submit(
                NewObjection::new(ViolationType::Speeding, "رقم اللوحة خاطئ وأرفقت صورة"),
                Priority::Low,
                now,
            )
            .id()
            .to_string();
        let weak = store
            .submit(NewObjection::new(ViolationType::Speeding, "أرجو الإلغاء"), Priority::Low, now)
            .id()
            .to_string();

        let view = cmd_analyze_all(&ObjectionAnalyzer::offline(), &mut store)
            .await
            .unwrap();

        let ranked: Vec<&str> = view.items().iter().map(|o| o.id()).collect();
        assert_eq!(ranked, vec![strong.as_str(), weak.as_str()]);
        assert!(!view.is_sorted());

        let stored: Vec<&str> = store.iter().map(|o| o.id()).collect();
        assert_eq!(stored, vec![weak.as_str(), strong.as_str()]);
        assert_eq!(store.get(&strong).unwrap().priority(), Priority::High);
    }

    #[test]
    fn clear_replaces_corrupt_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objections.json");
        std::fs::write(&path, "{not json").unwrap();

        cmd_clear(&path).unwrap();

        let store = ObjectionStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objections.json");
        let mut store = ObjectionStore::new();
        store.submit(NewObjection::new(ViolationType::NoSeatBelt, "نص"), Priority::Low, Utc::now());
        store.save(&path).unwrap();

        cmd_clear(&path).unwrap();
        assert!(ObjectionStore::load(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_refuses_too_many_images() {
        let mut store = ObjectionStore::new();
        let images: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        let submission = NewObjection::new(ViolationType::Speeding, "نص");
        let err = cmd_submit(&ObjectionAnalyzer::offline(), &mut store, submission, &images)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at most 3"));
        assert!(store.is_empty());
    }
}
