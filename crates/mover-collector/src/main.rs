//! 무기한 선물 변동률 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 시장 4시간 변동률
//! mover market --timeframe 4h
//!
//! # 제외 목록과 동시 조회 수 지정, JSON 출력
//! mover market --timeframe 7d --exclude "BTC, ETH" --concurrency 10 --format json
//!
//! # 관심종목 파일 분석
//! mover watchlist --file watchlist.json --timeframe 30m
//!
//! # 차트 캔들 조회
//! mover chart --symbol BTCUSDT --timeframe 1d
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use mover_collector::{
    modules::{load_chart, AnalysisRequest, MoversAnalyzer},
    output::{render_chart, render_instruments, render_report},
    AnalysisError, AnalyzerConfig, OutputFormat,
};
use mover_core::{
    parse_exclusion_list, Clock, Lookback, SystemClock, UniverseSelection, Watchlist,
};
use mover_exchange::MarketDataProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mover")]
#[command(about = "Bybit perpetual-futures movers analyzer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 시장 변동률 분석
    Market {
        /// 조회 기간 (예: 30m, 4h, 7d)
        #[arg(short, long, default_value = "24h")]
        timeframe: String,

        /// 제외할 심볼 루트 (쉼표 구분, 예: "BTC, ETH")
        #[arg(long)]
        exclude: Option<String>,

        /// 동시 조회 수
        #[arg(long)]
        concurrency: Option<usize>,

        /// 출력 형식
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 관심종목 파일 분석 (long_watchlist / short_watchlist)
    Watchlist {
        /// 관심종목 JSON 파일 경로
        #[arg(long)]
        file: PathBuf,

        /// 조회 기간 (예: 30m, 4h, 7d)
        #[arg(short, long, default_value = "24h")]
        timeframe: String,

        /// 동시 조회 수
        #[arg(long)]
        concurrency: Option<usize>,

        /// 출력 형식
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 차트 캔들 시계열 조회
    Chart {
        /// 심볼 (예: BTCUSDT)
        #[arg(short, long)]
        symbol: String,

        /// 조회 기간 (예: 30m, 4h, 7d)
        #[arg(short, long, default_value = "24h")]
        timeframe: String,

        /// 출력 형식
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 거래 가능한 종목 카탈로그 출력
    Instruments {
        /// 출력 형식
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn log_progress(processed: usize, total: usize) {
    if processed == total || processed % 50 == 0 {
        tracing::info!(progress = format!("{}/{}", processed, total), "캔들 조회 진행 중");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화 (stdout은 결과 전용, 로그는 stderr)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "mover_collector={},mover_exchange={},mover_analytics={},mover_core={}",
                    cli.log_level, cli.log_level, cli.log_level, cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AnalyzerConfig::from_env()?;
    tracing::debug!(
        base_url = %config.exchange.base_url,
        quote = %config.exchange.quote_coin,
        concurrency = config.fetch.concurrency_limit,
        "설정 로드 완료"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(config.build_provider(Arc::clone(&clock)));
    let quote_coin = config.exchange.quote_coin.clone();

    match cli.command {
        Commands::Market {
            timeframe,
            exclude,
            concurrency,
            format,
        } => {
            let lookback: Lookback = timeframe.parse().map_err(AnalysisError::from)?;
            let excluded_roots = exclude
                .as_deref()
                .map(parse_exclusion_list)
                .unwrap_or_else(|| config.universe.excluded_roots.clone());

            let analyzer = MoversAnalyzer::from_config(provider, clock, &config)
                .with_concurrency_limit(concurrency.unwrap_or(config.fetch.concurrency_limit));
            let request = AnalysisRequest {
                lookback,
                selection: UniverseSelection::Market { excluded_roots },
            };

            let report = analyzer.run(&request, Some(&log_progress)).await?;
            println!("{}", render_report(&report, format, &quote_coin)?);
        }
        Commands::Watchlist {
            file,
            timeframe,
            concurrency,
            format,
        } => {
            let lookback: Lookback = timeframe.parse().map_err(AnalysisError::from)?;
            let raw = tokio::fs::read_to_string(&file)
                .await
                .map_err(AnalysisError::from)?;
            let watchlist = Watchlist::from_json_str(&raw).map_err(AnalysisError::from)?;

            let analyzer = MoversAnalyzer::from_config(provider, clock, &config)
                .with_concurrency_limit(concurrency.unwrap_or(config.fetch.concurrency_limit));
            let request = AnalysisRequest {
                lookback,
                selection: UniverseSelection::Watchlist(watchlist),
            };

            let report = analyzer.run(&request, Some(&log_progress)).await?;
            println!("{}", render_report(&report, format, &quote_coin)?);
        }
        Commands::Chart {
            symbol,
            timeframe,
            format,
        } => {
            let lookback: Lookback = timeframe.parse().map_err(AnalysisError::from)?;
            let series = load_chart(provider.as_ref(), &symbol, &lookback).await?;
            println!("{}", render_chart(&series, format)?);
        }
        Commands::Instruments { format } => {
            let instruments = provider
                .fetch_instruments()
                .await
                .map_err(AnalysisError::Catalog)?;
            println!("{}", render_instruments(&instruments, format)?);
        }
    }

    Ok(())
}
