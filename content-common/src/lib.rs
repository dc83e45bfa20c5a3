pub mod compression;
pub mod error;
pub mod models;
pub mod ordering;
pub mod read_time;
pub mod sanity;
pub mod validate;

// 重新导出常用模块和函数，方便直接使用
pub use compression::{from_compressed, to_compressed, SnapshotError, SNAPSHOT_VERSION};
pub use error::ContentError;
pub use models::{
    Author, AuthorRef, ContentBlock, ContentSnapshot, ImageRef, Portfolio, PortfolioRow, Post,
    Service, Tag, TagRef,
};
pub use read_time::{estimate_minutes, WORDS_PER_MINUTE};
pub use validate::{slugify, validate_snapshot};
