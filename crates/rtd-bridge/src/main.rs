//! RTD 브리지 CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtd_bridge::{Bridge, BridgeConfig, MockSheet, RelayClient, SheetKind};

#[derive(Parser)]
#[command(name = "rtd-bridge")]
#[command(about = "RTD sheet polling bridge", long_about = None)]
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
    /// 데몬 모드: 주기적으로 사이클 실행
    Run,

    /// 한 사이클만 실행하고 종료 (진단용)
    Once,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rtd_bridge={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("RTD bridge 시작");

    let config = BridgeConfig::from_env()?;
    tracing::debug!(api_base = %config.api_base, sheet = ?config.sheet_kind, "설정 로드 완료");

    let relay = RelayClient::new(&config)?;
    let sheet = match config.sheet_kind {
        SheetKind::Mock => MockSheet::new(config.sheet.clone()),
    };

    let mut bridge = Bridge::new(sheet, relay, config.poll.clone());

    match cli.command {
        Commands::Run => {
            bridge.run().await?;
        }
        Commands::Once => match bridge.run_cycle().await? {
            Some(tick) => {
                tracing::info!(ticker = %tick.ticker, price = %tick.price, "사이클 발행 완료");
            }
            None => {
                tracing::info!("요청된 티커 없음, 발행 생략");
            }
        },
    }

    tracing::info!("RTD bridge 종료");

    Ok(())
}
