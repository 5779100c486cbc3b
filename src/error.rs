//! 에러 타입 정의

use std::path::PathBuf;

use thiserror::Error;

/// ICMP 전송 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("전송할 파일 경로가 지정되지 않음")]
    MissingFile,

    #[error("유효하지 않은 식별자: {0} (1~65535)")]
    InvalidIdentifier(i64),

    #[error("유효하지 않은 청크 크기: {0}")]
    InvalidChunkSize(usize),

    #[error("알 수 없는 옵션: {0}")]
    UnknownFlag(String),

    #[error("옵션 값 누락: {0}")]
    MissingValue(String),

    #[error("유효하지 않은 옵션 값: {flag}={value}")]
    InvalidArgument { flag: String, value: String },

    #[error("파일 읽기 실패 ({path:?}): {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ICMP 소켓 생성 실패: {0}")]
    TransportOpen(#[source] std::io::Error),

    #[error("유효하지 않은 목적지 IPv4 주소: {address}")]
    AddressResolution { address: String },

    #[error("ICMP 직렬화 에러: 데이터 {len} 바이트, 최대 {max} 바이트")]
    Serialization { len: usize, max: usize },

    #[error("프레임 {frame} 전송 실패: {source}")]
    Transmit {
        frame: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("프레임 {frame} 전송 타임아웃")]
    WriteTimeout { frame: usize },

    #[error("전송 중단됨: {sent}개 프레임 전송 후")]
    Cancelled { sent: usize },

    #[error("이미 사용된 송신자")]
    SessionConsumed,
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
