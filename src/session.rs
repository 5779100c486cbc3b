//! 전송 세션
//!
//! 검증된 설정과 읽어 들인 파일로 한 번 만들어지고, 송신자가 한 번 소비한다.

use std::net::Ipv4Addr;
use std::num::{NonZeroU16, NonZeroUsize};
use std::path::Path;

use bytes::Bytes;
use tracing::info;

use crate::frame::{Frame, FrameBuilder, NameTag};
use crate::{Config, Error, Result};

/// 파일 하나의 전송 단위
#[derive(Debug, Clone)]
pub struct TransferSession {
    identifier: NonZeroU16,
    destination: Ipv4Addr,
    chunk_size: NonZeroUsize,
    name_tag: NameTag,
    frames: Vec<Frame>,
    source_len: usize,
    source_crc32: u32,
}

impl TransferSession {
    /// 이미 읽은 데이터로 세션 생성
    pub fn new(
        identifier: u16,
        destination: Ipv4Addr,
        chunk_size: usize,
        name: &[u8],
        data: Bytes,
    ) -> Result<Self> {
        let identifier =
            NonZeroU16::new(identifier).ok_or(Error::InvalidIdentifier(identifier.into()))?;
        let chunk_size = NonZeroUsize::new(chunk_size).ok_or(Error::InvalidChunkSize(chunk_size))?;
        let builder = FrameBuilder::new(chunk_size.get())?;

        let name_tag = NameTag::from_bytes(name);
        let frames = builder.build(&data, name_tag);

        Ok(Self {
            identifier,
            destination,
            chunk_size,
            name_tag,
            frames,
            source_len: data.len(),
            source_crc32: crc32fast::hash(&data),
        })
    }

    /// 설정 검증 후 파일을 읽어 세션 생성
    ///
    /// 네트워크 작업 전에 주소와 파일을 모두 확인한다.
    pub async fn prepare(config: &Config) -> Result<Self> {
        config.validate()?;
        let destination = config.destination_addr()?;
        let path = config.file_path.as_deref().ok_or(Error::MissingFile)?;

        let data = read_source(path).await?;
        info!("Loaded file {:?}: {} bytes", path, data.len());

        Self::new(
            config.identifier,
            destination,
            config.chunk_size,
            path.as_os_str().as_encoded_bytes(),
            data,
        )
    }

    pub fn identifier(&self) -> u16 {
        self.identifier.get()
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.destination
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    pub fn name_tag(&self) -> &NameTag {
        &self.name_tag
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 원본 데이터 크기
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// 원본 데이터 CRC32 (수신측 검증용으로 로그에 남김)
    pub fn source_crc32(&self) -> u32 {
        self.source_crc32
    }

    pub(crate) fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

async fn read_source(path: &Path) -> Result<Bytes> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| Error::SourceRead {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_session_frames() {
        let data = Bytes::from(vec![3u8; 25000]);
        let session =
            TransferSession::new(42, Ipv4Addr::LOCALHOST, 8980, b"big.bin", data.clone()).unwrap();

        assert_eq!(session.identifier(), 42);
        assert_eq!(session.frame_count(), 3);
        assert_eq!(session.source_len(), 25000);
        assert_eq!(session.source_crc32(), crc32fast::hash(&data));
        assert!(session.frames().iter().all(|f| f.name_tag == *session.name_tag()));
    }

    #[test]
    fn test_session_rejects_zero_values() {
        let data = Bytes::from_static(b"abc");
        assert!(matches!(
            TransferSession::new(0, Ipv4Addr::LOCALHOST, 10, b"a", data.clone()),
            Err(Error::InvalidIdentifier(0))
        ));
        assert!(matches!(
            TransferSession::new(1, Ipv4Addr::LOCALHOST, 0, b"a", data),
            Err(Error::InvalidChunkSize(0))
        ));
    }

    #[tokio::test]
    async fn test_prepare_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[5u8; 1000]).unwrap();

        let config = Config {
            identifier: 9,
            file_path: Some(file.path().to_path_buf()),
            chunk_size: 300,
            ..Config::default()
        };

        let session = TransferSession::prepare(&config).await.unwrap();
        assert_eq!(session.frame_count(), 4);
        assert_eq!(session.destination(), Ipv4Addr::LOCALHOST);

        let path_bytes = file.path().as_os_str().as_encoded_bytes();
        let expected = &path_bytes[..path_bytes.len().min(100)];
        assert_eq!(&session.name_tag().as_bytes()[..expected.len()], expected);
    }

    #[tokio::test]
    async fn test_prepare_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            identifier: 9,
            file_path: Some(dir.path().join("does-not-exist.bin")),
            ..Config::default()
        };

        let err = TransferSession::prepare(&config).await.unwrap_err();
        assert!(matches!(err, Error::SourceRead { .. }));
    }

    #[tokio::test]
    async fn test_prepare_bad_destination_before_read() {
        let config = Config {
            destination: "300.1.1.1".to_string(),
            identifier: 9,
            file_path: Some("/definitely/not/here".into()),
            ..Config::default()
        };

        let err = TransferSession::prepare(&config).await.unwrap_err();
        assert!(matches!(err, Error::AddressResolution { .. }));
    }
}
