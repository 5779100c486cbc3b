//! ICMP 파일 송신기
//!
//! 파일을 청크로 나눠 ICMP Echo Request 패킷으로 전송
//! - 패킷 data = 100바이트 파일 이름 태그 + 청크
//! - raw 소켓 사용: root 또는 CAP_NET_RAW 필요
//!
//! 사용법:
//!   icmp-send -id <N> -f <PATH> [-d <IP>] [-s <BYTES>]
//!
//! 예시:
//!   sudo icmp-send -d 192.168.1.100 -id 4242 -f data.bin
//!
//! 로그 레벨은 RUST_LOG로 조절 (기본: info)

#[cfg(not(unix))]
compile_error!("icmp-send requires raw socket support (unix only)");

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use icmp_send::config::usage;
use icmp_send::{Command, Config, IcmpSocket, Result, Sender, TransferSession};

#[tokio::main]
async fn main() -> std::result::Result<ExitCode, Box<dyn std::error::Error>> {
    // 로깅 설정
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match Config::from_args(std::env::args_os().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Usage) => {
            print!("{}", usage());
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("{}", e);
            eprint!("{}", usage());
            return Ok(ExitCode::from(2));
        }
    };

    match run(config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(config: Config) -> Result<()> {
    info!("ICMP sender starting...");
    info!("Destination: {}", config.destination);
    info!("Identifier: {}", config.identifier);
    info!("Chunk size: {} bytes", config.chunk_size);

    // 파일과 주소는 소켓을 열기 전에 확인
    let session = TransferSession::prepare(&config).await?;
    let socket = IcmpSocket::open()?;

    let mut sender = Sender::new(&config);
    let stop = sender.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current frame");
            stop.stop();
        }
    });

    let stats = sender.run(session, &socket).await?;
    info!("{} packets sent", stats.frames_sent);

    Ok(())
}
