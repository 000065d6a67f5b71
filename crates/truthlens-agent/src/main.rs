//! TruthLens — Ensemble credibility scoring for news articles
//! Entry point for the `truthlens` binary.

mod config;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use truthlens_common::{InputData, InputKind, Language, NewsCategory};
use truthlens_llm::{GeminiBackend, LlmBackend, OpenAiCompatibleBackend};
use truthlens_pipeline::{filter_news, AnalysisCache, AnalysisFetcher, Analyzer, NewsFeed};
use truthlens_ranker::{compute_ensemble_score, sample_record, AnalysisRecord, ModuleWeights};

#[derive(Parser)]
#[command(name = "truthlens", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an analysis record with the ensemble model
    Score {
        /// JSON file holding an analysis record
        #[arg(long, conflicts_with = "sample")]
        record: Option<PathBuf>,
        /// Score the built-in sample record
        #[arg(long)]
        sample: bool,
        #[command(flatten)]
        weights: WeightArgs,
    },
    /// Analyze an article with the configured model and print the report
    Analyze {
        /// Article URL
        #[arg(long, required_unless_present = "body_file", conflicts_with = "body_file")]
        url: Option<String>,
        /// File holding the article text
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        /// english or korean
        #[arg(long, value_parser = parse_language)]
        language: Option<Language>,
    },
    /// List recommended news articles
    News {
        /// Politics, Economy, Society, IT/Tech, World, Search or Keywords
        #[arg(long, default_value = "Politics", value_parser = parse_category)]
        category: NewsCategory,
        #[arg(long)]
        query: Option<String>,
        /// Keep only items whose title or source contains this text
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, value_parser = parse_language)]
        language: Option<Language>,
    },
    /// Start the HTTP API
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Per-module weight overrides; unset modules keep the configured weight.
#[derive(Args)]
struct WeightArgs {
    #[arg(long)]
    source: Option<f64>,
    #[arg(long)]
    cross_check: Option<f64>,
    #[arg(long)]
    logic: Option<f64>,
    #[arg(long)]
    context: Option<f64>,
    #[arg(long)]
    bias: Option<f64>,
}

impl WeightArgs {
    fn apply(&self, base: ModuleWeights) -> ModuleWeights {
        ModuleWeights {
            source: self.source.unwrap_or(base.source),
            cross_check: self.cross_check.unwrap_or(base.cross_check),
            logic: self.logic.unwrap_or(base.logic),
            context: self.context.unwrap_or(base.context),
            bias: self.bias.unwrap_or(base.bias),
        }
    }
}

fn parse_language(s: &str) -> Result<Language, String> {
    match s.to_ascii_lowercase().as_str() {
        "english" | "en" => Ok(Language::English),
        "korean" | "ko" => Ok(Language::Korean),
        other => Err(format!("unknown language: {other}")),
    }
}

fn parse_category(s: &str) -> Result<NewsCategory, String> {
    s.parse().map_err(|e: truthlens_common::TruthLensError| e.to_string())
}

fn build_llm_backend(config: &config::LlmConfig) -> anyhow::Result<Arc<dyn LlmBackend>> {
    match config.provider.as_str() {
        "gemini" => {
            if config.api_key.is_empty() {
                anyhow::bail!(
                    "Gemini configured but no API key found (set llm.api_key or {})",
                    config::GEMINI_KEY_ENV
                );
            }
            let mut backend = GeminiBackend::new(config.api_key.clone(), config.model.clone());
            if let Some(ref url) = config.base_url {
                backend = backend.with_base_url(url.clone());
            }
            Ok(Arc::new(backend))
        }
        "openai_compatible" => {
            let base_url = config
                .base_url
                .clone()
                .context("llm.base_url is required for the openai_compatible provider")?;
            let key = (!config.api_key.is_empty()).then(|| config.api_key.clone());
            Ok(Arc::new(OpenAiCompatibleBackend::new(base_url, config.model.clone(), key)))
        }
        other => anyhow::bail!("unknown llm.provider: {other}"),
    }
}

fn build_analyzer(config: &config::Config) -> anyhow::Result<Arc<Analyzer>> {
    let backend = build_llm_backend(&config.llm)?;
    let cache = match config.cache.path {
        Some(ref path) => AnalysisCache::with_persistence(config.cache_ttl(), path)?,
        None => AnalysisCache::new(config.cache_ttl()),
    };
    info!(
        backend = backend.backend_name(),
        model = backend.model_id(),
        cache_entries = cache.len(),
        "analyzer ready"
    );
    Ok(Arc::new(Analyzer::with_cache(backend, Arc::new(cache), config.analyzer_config())))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("truthlens=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    match cli.command {
        Commands::Score { record, sample, weights } => {
            let record: AnalysisRecord = match record {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&content)
                        .with_context(|| format!("parsing analysis record {}", path.display()))?
                }
                None => {
                    if !sample {
                        info!("no --record given, scoring the sample record");
                    }
                    sample_record()
                }
            };
            let weights = weights.apply(config.scoring.weights);
            weights.validate()?;

            let result = compute_ensemble_score(&record, &weights);
            let verdict = result.verdict();
            print_json(&json!({
                "score": result.score,
                "verdict": verdict,
                "verdict_range": verdict.score_range(),
                "verdict_description": verdict.description(),
                "module_scores": result.module_scores,
                "contribution": result.contribution,
                "total_weight": weights.total(),
            }))
        }

        Commands::Analyze { url, body_file, title, language } => {
            let mut input = match (url, body_file) {
                (Some(url), _) => InputData::from_url(url),
                (None, Some(path)) => {
                    let body = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    InputData { body: Some(body), input_type: InputKind::Manual, ..Default::default() }
                }
                (None, None) => anyhow::bail!("either --url or --body-file is required"),
            };
            if title.is_some() {
                input.title = title;
            }
            input.language = language.unwrap_or(config.llm.language);

            let analyzer = build_analyzer(&config)?;
            let analysis = analyzer
                .fetch_analysis(&input)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;
            print_json(&analysis)
        }

        Commands::News { category, query, filter, language } => {
            let analyzer = build_analyzer(&config)?;
            let language = language.unwrap_or(config.llm.language);
            let items = analyzer.fetch_top_news(category, query.as_deref(), language).await;
            let items = match filter {
                Some(ref f) => filter_news(&items, f),
                None => items,
            };
            print_json(&items)
        }

        Commands::Serve { bind } => {
            let analyzer = build_analyzer(&config)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            info!("TruthLens {} starting API on http://{}", env!("CARGO_PKG_VERSION"), bind);

            let state = truthlens_web::AppState::new(analyzer.clone(), analyzer)
                .with_weights(config.scoring.weights)
                .with_language(config.llm.language);
            truthlens_web::serve(&bind, state).await?;
            Ok(())
        }
    }
}
