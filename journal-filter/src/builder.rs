use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use content_common::compression::{to_compressed, SnapshotError, SNAPSHOT_VERSION};
use content_common::models::{ContentSnapshot, Portfolio, Post, Service, Tag};
use content_common::ordering::{sort_posts_newest_first, sort_services_by_rank, sort_tags_by_title};
use content_common::validate::validate_snapshot;
use content_common::ContentError;

/// 快照构建错误
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("内容校验失败，共 {} 个错误", .0.len())]
    Invalid(Vec<ContentError>),

    #[error("压缩快照失败")]
    Snapshot(#[from] SnapshotError),

    #[error("无法写入快照文件 `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 快照构建器
///
/// 收集文档后统一排序、校验，再写出压缩快照。
#[derive(Default)]
pub struct SnapshotBuilder {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    services: Vec<Service>,
    portfolio: Option<Portfolio>,
}

impl SnapshotBuilder {
    /// 创建新的快照构建器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    pub fn set_portfolio(&mut self, portfolio: Portfolio) {
        if self.portfolio.is_some() {
            warn!("存在多个作品集文档，使用最后一个: {}", portfolio.id);
        }
        self.portfolio = Some(portfolio);
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// 构建快照：文章按发布时间降序，标签按标题，服务按排名
    pub fn build(&self) -> Result<ContentSnapshot, BuildError> {
        if self.posts.is_empty() {
            warn!("快照中没有文章");
        }

        let mut snapshot = ContentSnapshot {
            posts: self.posts.clone(),
            tags: self.tags.clone(),
            services: self.services.clone(),
            portfolio: self.portfolio.clone(),
            generated_at: Utc::now(),
        };
        sort_posts_newest_first(&mut snapshot.posts);
        sort_tags_by_title(&mut snapshot.tags);
        sort_services_by_rank(&mut snapshot.services);

        validate_snapshot(&snapshot).map_err(BuildError::Invalid)?;

        debug!(
            posts = snapshot.posts.len(),
            tags = snapshot.tags.len(),
            services = snapshot.services.len(),
            "快照构建完成"
        );
        Ok(snapshot)
    }

    /// 构建并压缩快照
    pub fn build_compressed(&self) -> Result<Vec<u8>, BuildError> {
        let snapshot = self.build()?;
        Ok(to_compressed(&snapshot, SNAPSHOT_VERSION)?)
    }
}

/// 压缩快照并写入文件，返回写入的字节数
pub fn write_snapshot(snapshot: &ContentSnapshot, path: &Path) -> Result<usize, BuildError> {
    let compressed = to_compressed(snapshot, SNAPSHOT_VERSION)?;
    let io_error = |source| BuildError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(&compressed).map_err(io_error)?;

    info!("快照已写入文件: {}，大小: {} 字节", path.display(), compressed.len());
    Ok(compressed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use content_common::compression::from_compressed;
    use content_common::models::AuthorRef;

    fn post(id: &str, day: Option<u32>) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Title {id}"),
            slug: id.to_string(),
            excerpt: "Preview".to_string(),
            published_at: day.map(|d| Utc.with_ymd_and_hms(2025, 2, d, 0, 0, 0).unwrap()),
            featured_image: None,
            author: AuthorRef {
                name: "Avery Lane".to_string(),
                image: None,
            },
            tags: Vec::new(),
            content: None,
        }
    }

    #[test]
    fn build_orders_posts_newest_first() {
        let mut builder = SnapshotBuilder::new();
        builder.add_post(post("older", Some(1)));
        builder.add_post(post("undated", None));
        builder.add_post(post("newer", Some(20)));

        let snapshot = builder.build().unwrap();
        let ids: Vec<&str> = snapshot.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older", "undated"]);
    }

    #[test]
    fn invalid_content_is_rejected() {
        let mut builder = SnapshotBuilder::new();
        builder.add_post(post("same", Some(1)));
        builder.add_post(post("same", Some(2)));
        match builder.build() {
            Err(BuildError::Invalid(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn compressed_snapshot_round_trips() {
        let mut builder = SnapshotBuilder::new();
        builder.add_post(post("only", Some(3)));
        let bytes = builder.build_compressed().unwrap();
        let snapshot: ContentSnapshot = from_compressed(&bytes).unwrap();
        assert_eq!(snapshot.posts.len(), 1);
        assert_eq!(snapshot.posts[0].slug, "only");
    }
}
