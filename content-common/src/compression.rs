use std::io::{Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use thiserror::Error;

/// 魔数常量 - 用于标识快照文件格式
pub const MAGIC_BYTES: &[u8] = b"TLHCS"; // The Layered Home Content Snapshot

/// 当前快照格式版本 [主版本, 次版本]
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 头部长度：魔数 + 版本号 + 原始数据大小
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 快照编解码错误
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),

    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    #[error("不支持的版本: {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("压缩数据读写失败")]
    Io(#[from] std::io::Error),
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, SnapshotError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, SnapshotError> {
    let binary = to_binary(obj)?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&binary)?;
    output.extend_from_slice(&encoder.finish()?);

    Ok(output)
}

/// 从压缩的二进制格式反序列化对象，只接受当前主版本
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, SnapshotError> {
    from_compressed_with_max_version(data, SNAPSHOT_VERSION[0])
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大主版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, SnapshotError> {
    validate_compressed_data_with_max_version(data, max_version)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);
    let original_size = u32::from_le_bytes(size_bytes) as usize;

    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    let mut decompressed = Vec::with_capacity(original_size);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(SnapshotError::SizeMismatch {
            expected: original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 验证压缩数据头部，返回版本号
pub fn validate_compressed_data_with_max_version(
    data: &[u8],
    max_version: u8,
) -> Result<[u8; 2], SnapshotError> {
    if data.len() < HEADER_LEN {
        return Err(SnapshotError::TooShort(data.len()));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(SnapshotError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(SnapshotError::UnsupportedVersion(version[0], version[1]));
    }

    Ok(version)
}
