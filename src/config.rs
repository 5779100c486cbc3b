//! 송신 설정
//!
//! 명령행 형식은 Go `flag` 패키지 스타일을 따른다:
//! `-f data.bin`, `-f=data.bin`, `--f data.bin` 모두 허용.

use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    Error, Result, DEFAULT_CHUNK_SIZE, DEFAULT_DESTINATION, DEFAULT_SEND_INTERVAL_MS,
    DEFAULT_WRITE_TIMEOUT_MS,
};

/// 송신 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 목적지 IPv4 주소 (문자열 그대로, 세션 생성 시 검증)
    pub destination: String,

    /// 세션 식별자, 0이면 미지정
    pub identifier: u16,

    /// 전송할 파일 경로 (이름 태그의 원본)
    pub file_path: Option<PathBuf>,

    /// 프레임당 최대 페이로드 크기 (바이트)
    pub chunk_size: usize,

    /// 패킷 전송 간격
    pub send_interval: Duration,

    /// 패킷 하나의 쓰기 타임아웃, `None`이면 무제한
    pub write_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            identifier: 0,
            file_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            send_interval: Duration::from_millis(DEFAULT_SEND_INTERVAL_MS),
            write_timeout: Some(Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS)),
        }
    }
}

/// 명령행 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 전송 실행
    Run(Config),

    /// 사용법 출력 후 정상 종료 (`-help`, `-f` 누락, `-id` 0)
    Usage,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// 명령행 인자 해석 (프로그램 이름 제외)
    pub fn from_args<I, S>(args: I) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut config = Self::default();
        let mut help = false;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let arg = arg
                .into_string()
                .map_err(|raw| Error::UnknownFlag(raw.to_string_lossy().into_owned()))?;

            let body = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .filter(|body| !body.is_empty())
                .ok_or_else(|| Error::UnknownFlag(arg.clone()))?;

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(OsString::from(value))),
                None => (body, None),
            };

            if name == "help" || name == "h" {
                help = match &inline {
                    Some(value) => parse_bool(name, value)?,
                    None => true,
                };
                continue;
            }
            if !matches!(name, "d" | "id" | "f" | "s") {
                return Err(Error::UnknownFlag(arg.clone()));
            }

            let value = match inline {
                Some(value) => value,
                None => args
                    .next()
                    .ok_or_else(|| Error::MissingValue(format!("-{}", name)))?,
            };

            match name {
                "d" => config.destination = value.to_string_lossy().into_owned(),
                "f" => config.file_path = Some(PathBuf::from(value)),
                "id" => config.identifier = parse_identifier(&value)?,
                "s" => config.chunk_size = parse_number(name, &value)?,
                _ => unreachable!(),
            }
        }

        if help || !config.has_file_path() || config.identifier == 0 {
            return Ok(Command::Usage);
        }

        Ok(Command::Run(config))
    }

    /// 파일 경로 지정 여부 (빈 경로는 미지정)
    pub fn has_file_path(&self) -> bool {
        self.file_path
            .as_ref()
            .is_some_and(|path| !path.as_os_str().is_empty())
    }

    /// 설정 검증 (파일은 읽지 않음)
    pub fn validate(&self) -> Result<()> {
        if !self.has_file_path() {
            return Err(Error::MissingFile);
        }
        if self.identifier == 0 {
            return Err(Error::InvalidIdentifier(0));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidChunkSize(self.chunk_size));
        }
        self.destination_addr()?;
        Ok(())
    }

    /// 목적지 주소 해석
    ///
    /// raw 소켓이 IPv4 전용이므로 IPv6 주소도 거부한다.
    pub fn destination_addr(&self) -> Result<Ipv4Addr> {
        match self.destination.parse::<IpAddr>() {
            Ok(IpAddr::V4(addr)) => Ok(addr),
            Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().ok_or_else(|| Error::AddressResolution {
                address: self.destination.clone(),
            }),
            Err(_) => Err(Error::AddressResolution {
                address: self.destination.clone(),
            }),
        }
    }
}

fn parse_number(flag: &str, value: &OsString) -> Result<usize> {
    value
        .to_str()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::InvalidArgument {
            flag: format!("-{}", flag),
            value: value.to_string_lossy().into_owned(),
        })
}

/// Go `strconv.ParseBool`과 같은 표기 허용
fn parse_bool(flag: &str, value: &OsString) -> Result<bool> {
    match value.to_str() {
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => Ok(false),
        _ => Err(Error::InvalidArgument {
            flag: format!("-{}", flag),
            value: value.to_string_lossy().into_owned(),
        }),
    }
}

fn parse_identifier(value: &OsString) -> Result<u16> {
    let invalid = || Error::InvalidArgument {
        flag: "-id".to_string(),
        value: value.to_string_lossy().into_owned(),
    };

    let id: i64 = value
        .to_str()
        .and_then(|v| v.parse().ok())
        .ok_or_else(invalid)?;

    u16::try_from(id).map_err(|_| Error::InvalidIdentifier(id))
}

/// 사용법 문자열
pub fn usage() -> String {
    format!(
        r#"ICMP 파일 전송 - 파일을 ICMP Echo Request 패킷으로 전송

사용법:
  icmp-send [OPTIONS]

옵션:
  -d <IP>       목적지 IPv4 주소 (기본: {dest})
  -id <N>       세션 식별자 1~65535 (필수)
  -f <PATH>     전송할 파일 경로 (필수)
  -s <BYTES>    패킷당 최대 페이로드 크기 (기본: {chunk})
  -help         이 도움말 출력

예시:
  # 로컬로 전송
  sudo icmp-send -id 4242 -f data.bin

  # 원격 호스트로 1KB 청크 전송
  sudo icmp-send -d 192.168.1.100 -id 7 -f report.pdf -s 1024
"#,
        dest = DEFAULT_DESTINATION,
        chunk = DEFAULT_CHUNK_SIZE,
    )
}
