//! # ICMP Send
//!
//! 파일을 ICMP Echo Request 패킷에 실어 보내는 단방향 전송 도구
//!
//! ## 핵심 특징
//! - **고정 프레임**: 100바이트 이름 태그 + 최대 `chunk_size` 바이트 페이로드
//! - **단방향**: 수신 확인, 재전송, 재조립 없음
//! - **고정 pacing**: 패킷 사이 200ms 대기
//! - **첫 에러에서 중단**: 모든 실패는 `Result`로 반환
//!
//! ```text
//! 파일 → FrameBuilder → Frame* → Sender → EchoRequest → PacketTransport
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod icmp;
pub mod sender;
pub mod session;
pub mod stats;
pub mod transport;

pub use config::{Command, Config};
pub use error::{Error, Result};
pub use frame::{build_frames, Frame, FrameBuilder, NameTag};
pub use icmp::EchoRequest;
pub use sender::{run_session, DriverState, Sender, StopHandle};
pub use session::TransferSession;
pub use stats::TransferStats;
#[cfg(unix)]
pub use transport::IcmpSocket;
pub use transport::PacketTransport;

/// 이름 태그 길이 (바이트)
pub const NAME_TAG_LEN: usize = 100;

/// 기본 청크 크기 (바이트)
pub const DEFAULT_CHUNK_SIZE: usize = 8980;

/// 기본 목적지 주소
pub const DEFAULT_DESTINATION: &str = "127.0.0.1";

/// 패킷 전송 간격 (밀리초)
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 200;

/// 패킷 쓰기 타임아웃 (밀리초)
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;

/// 모든 패킷의 Echo sequence 값
pub const ECHO_SEQUENCE: u16 = 1;
