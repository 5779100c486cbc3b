//! 프레임 정의
//!
//! - NameTag: 파일 이름을 100바이트 고정 길이로 정규화한 태그
//! - Frame: 이름 태그 + 파일 청크, ICMP Echo 패킷 하나에 대응
//!
//! 와이어 레이아웃 (Echo Request data 필드):
//!
//! ```text
//! offset 0..99   : 이름 태그 (100 bytes, 0 패딩 / 잘림)
//! offset 100..N  : 청크 페이로드 (최대 chunk_size bytes)
//! ```

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result, NAME_TAG_LEN};

/// 100바이트 고정 길이 이름 태그
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameTag([u8; NAME_TAG_LEN]);

impl NameTag {
    /// 바이트열에서 태그 생성
    ///
    /// 100바이트보다 길면 앞 100바이트만 사용하고, 짧으면 뒤를 0으로 채운다.
    pub fn from_bytes(name: &[u8]) -> Self {
        let mut tag = [0u8; NAME_TAG_LEN];
        let len = name.len().min(NAME_TAG_LEN);
        tag[..len].copy_from_slice(&name[..len]);
        Self(tag)
    }

    pub fn as_bytes(&self) -> &[u8; NAME_TAG_LEN] {
        &self.0
    }

    /// 첫 0 바이트 이전까지의 이름
    pub fn name(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_TAG_LEN);
        &self.0[..end]
    }
}

impl From<&str> for NameTag {
    fn from(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }
}

impl fmt::Debug for NameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameTag")
            .field(&String::from_utf8_lossy(self.name()))
            .finish()
    }
}

/// 프레임 (전송 패킷 단위)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 세션 내 0부터 시작하는 순서 (와이어에는 기록되지 않음)
    pub index: usize,

    /// 이름 태그 (세션 내 동일)
    pub name_tag: NameTag,

    /// 원본 데이터 슬라이스
    pub payload: Bytes,
}

impl Frame {
    /// 와이어 페이로드 길이
    pub fn wire_len(&self) -> usize {
        NAME_TAG_LEN + self.payload.len()
    }

    /// `name_tag || payload` 직렬화
    pub fn wire_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        buf.put_slice(self.name_tag.as_bytes());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// 수신한 data 필드를 이름 태그와 페이로드로 분리
    pub fn parse_wire(data: &[u8]) -> Option<(NameTag, &[u8])> {
        if data.len() < NAME_TAG_LEN {
            return None;
        }
        let (tag, payload) = data.split_at(NAME_TAG_LEN);
        Some((NameTag::from_bytes(tag), payload))
    }
}

/// 프레임 생성기
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    chunk_size: usize,
}

impl FrameBuilder {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize(chunk_size));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 예상 프레임 수
    pub fn frame_count(&self, data_len: usize) -> usize {
        data_len.div_ceil(self.chunk_size)
    }

    /// 데이터를 프레임들로 분할
    ///
    /// 빈 데이터는 프레임을 만들지 않는다. 페이로드는 `data`를 복사하지 않고 공유한다.
    pub fn build(&self, data: &Bytes, name_tag: NameTag) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(self.frame_count(data.len()));
        let mut offset = 0;

        while offset < data.len() {
            let end = (offset + self.chunk_size).min(data.len());
            frames.push(Frame {
                index: frames.len(),
                name_tag,
                payload: data.slice(offset..end),
            });
            offset = end;
        }

        frames
    }
}

/// 데이터, 이름, 청크 크기로 프레임 목록 생성
pub fn build_frames(data: &Bytes, name: &[u8], chunk_size: usize) -> Result<Vec<Frame>> {
    let builder = FrameBuilder::new(chunk_size)?;
    Ok(builder.build(data, NameTag::from_bytes(name)))
}
