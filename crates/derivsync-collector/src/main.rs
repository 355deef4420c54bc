//! Standalone derivatives data collector CLI.

use clap::{Parser, Subcommand};
use derivsync_collector::{modules, CollectorConfig};
use derivsync_core::logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "derivsync-collector")]
#[command(about = "DerivSync Derivatives Data Collector", long_about = None)]
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
    /// 선물 OHLC 히스토리 동기화
    SyncOhlc {
        /// 특정 심볼만 동기화 (쉼표로 구분, 예: "BTCUSDT,ETHUSDT")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 펀딩비 히스토리 동기화
    SyncFunding {
        /// 특정 심볼만 동기화 (쉼표로 구분)
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 거래소 합산 미결제약정 동기화
    SyncOpenInterest {
        /// 특정 심볼만 동기화 (쉼표로 구분, 예: "BTC,ETH")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 만기별 선물 가격 스냅샷 수집
    SnapshotFutures {
        /// 특정 자산만 수집 (쉼표로 구분, 예: "BTC,ETH")
        #[arg(long)]
        assets: Option<String>,
    },

    /// 전체 워크플로우 실행 (OHLC → 펀딩비 → 미결제약정 → 스냅샷)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

/// 전체 워크플로우 한 사이클 실행. 단계별 실패는 로그만 남기고 계속합니다.
async fn run_all(pool: &sqlx::PgPool, config: &CollectorConfig) {
    tracing::info!("=== 전체 워크플로우 시작 ===");

    tracing::info!("Step 1/4: OHLC 동기화");
    match modules::sync_ohlc(pool, config, None).await {
        Ok(stats) => stats.log_summary("OHLC 동기화"),
        Err(e) => tracing::error!("OHLC 동기화 실패: {}", e),
    }

    tracing::info!("Step 2/4: 펀딩비 동기화");
    match modules::sync_funding(pool, config, None).await {
        Ok(stats) => stats.log_summary("펀딩비 동기화"),
        Err(e) => tracing::error!("펀딩비 동기화 실패: {}", e),
    }

    tracing::info!("Step 3/4: 미결제약정 동기화");
    match modules::sync_open_interest(pool, config, None).await {
        Ok(stats) => stats.log_summary("미결제약정 동기화"),
        Err(e) => tracing::error!("미결제약정 동기화 실패: {}", e),
    }

    tracing::info!("Step 4/4: 선물 가격 스냅샷");
    match modules::snapshot_futures(pool, config, None).await {
        Ok(stats) => stats.log_summary("선물 가격 스냅샷"),
        Err(e) => tracing::error!("선물 가격 스냅샷 실패: {}", e),
    }

    tracing::info!("=== 전체 워크플로우 완료 ===");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    init_logging(LogConfig::new(&cli.log_level))?;

    tracing::info!("DerivSync Data Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        exchange = config.sync.exchange,
        interval = %config.sync.interval,
        "설정 로드 완료"
    );

    // DB 연결
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 명령 실행
    match cli.command {
        Commands::SyncOhlc { symbols } => {
            let stats = modules::sync_ohlc(&pool, &config, symbols).await?;
            stats.log_summary("OHLC 동기화");
        }
        Commands::SyncFunding { symbols } => {
            let stats = modules::sync_funding(&pool, &config, symbols).await?;
            stats.log_summary("펀딩비 동기화");
        }
        Commands::SyncOpenInterest { symbols } => {
            let stats = modules::sync_open_interest(&pool, &config, symbols).await?;
            stats.log_summary("미결제약정 동기화");
        }
        Commands::SnapshotFutures { assets } => {
            let stats = modules::snapshot_futures(&pool, &config, assets).await?;
            stats.log_summary("선물 가격 스냅샷");
        }
        Commands::RunAll => {
            run_all(&pool, &config).await;
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        run_all(&pool, &config).await;
                        tracing::info!(
                            "=== 워크플로우 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("DerivSync Data Collector 종료");

    Ok(())
}
