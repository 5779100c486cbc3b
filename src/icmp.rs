//! ICMPv4 Echo Request 인코딩
//!
//! ```text
//!  0               1               2               3
//! +---------------+---------------+-------------------------------+
//! |   Type (8)    |   Code (0)    |           Checksum            |
//! +---------------+---------------+-------------------------------+
//! |          Identifier           |        Sequence Number        |
//! +-------------------------------+-------------------------------+
//! |                           Data ...                            |
//! +---------------------------------------------------------------+
//! ```
//!
//! 다중 바이트 필드는 big-endian, 체크섬은 RFC 1071 인터넷 체크섬.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Echo Request 타입
pub const ICMP_ECHO_REQUEST: u8 = 8;

/// ICMP 헤더 크기 (바이트)
pub const ICMP_HEADER_LEN: usize = 8;

/// IPv4 헤더 크기 (옵션 없음)
pub const IPV4_HEADER_LEN: usize = 20;

/// Echo data 필드 최대 크기
pub const MAX_ECHO_DATA: usize = u16::MAX as usize - IPV4_HEADER_LEN - ICMP_HEADER_LEN;

/// ICMP Echo Request 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
    pub data: Bytes,
}

impl EchoRequest {
    pub fn new(identifier: u16, sequence: u16, data: Bytes) -> Self {
        Self {
            identifier,
            sequence,
            data,
        }
    }

    /// 전체 메시지 길이
    pub fn encoded_len(&self) -> usize {
        ICMP_HEADER_LEN + self.data.len()
    }

    /// 바이트로 직렬화
    pub fn to_bytes(&self) -> Result<Bytes> {
        if self.data.len() > MAX_ECHO_DATA {
            return Err(Error::Serialization {
                len: self.data.len(),
                max: MAX_ECHO_DATA,
            });
        }

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(ICMP_ECHO_REQUEST);
        buf.put_u8(0);
        buf.put_u16(0); // checksum placeholder
        buf.put_u16(self.identifier);
        buf.put_u16(self.sequence);
        buf.put_slice(&self.data);

        let csum = checksum(&buf);
        buf[2..4].copy_from_slice(&csum.to_be_bytes());

        Ok(buf.freeze())
    }

    /// 바이트에서 역직렬화
    ///
    /// 길이 부족, 타입/코드 불일치, 체크섬 오류 시 `None`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ICMP_HEADER_LEN {
            return None;
        }
        if checksum(bytes) != 0 {
            return None;
        }

        let mut header = &bytes[..ICMP_HEADER_LEN];
        if header.get_u8() != ICMP_ECHO_REQUEST || header.get_u8() != 0 {
            return None;
        }
        header.advance(2);
        let identifier = header.get_u16();
        let sequence = header.get_u16();

        Some(Self {
            identifier,
            sequence,
            data: Bytes::copy_from_slice(&bytes[ICMP_HEADER_LEN..]),
        })
    }
}

/// RFC 1071 인터넷 체크섬
///
/// 체크섬 필드를 포함한 올바른 메시지에 대해서는 0을 반환한다.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum = sum.wrapping_add(u16::from_be_bytes([word[0], word[1]]) as u32);
    }
    if let [last] = words.remainder() {
        sum = sum.wrapping_add((*last as u32) << 8);
    }
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}
