use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use content_common::models::ContentSnapshot;
use content_common::{estimate_minutes, ContentError};
use journal_filter::builder::{write_snapshot, BuildError};
use journal_filter::{derive_view, ListingQuery, DEFAULT_PAGE_SIZE};

pub mod dataset;

use dataset::Dataset;

/// 快照文件名
pub const SNAPSHOT_FILE_NAME: &str = "content_snapshot.bin";

/// 索引工具错误
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("无法读取 `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("解析 `{path}` 第 {line} 行失败")]
    Parse {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{path}` 中第 {index} 个文档格式错误")]
    Document {
        path: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("内容校验失败，共 {} 个错误", .0.len())]
    Content(Vec<ContentError>),

    #[error("生成快照失败")]
    Build(#[source] BuildError),

    #[error("`{0}` 中没有找到导出文件（.ndjson 或 .json）")]
    NoSources(String),
}

impl From<BuildError> for IndexerError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::Invalid(errors) => IndexerError::Content(errors),
            other => IndexerError::Build(other),
        }
    }
}

/// 索引选项
#[derive(Debug, Clone)]
pub struct IndexerOptions {
    /// 导出文件或目录
    pub source: PathBuf,
    /// 快照输出目录
    pub output: PathBuf,
    pub page_size: usize,
    pub verbose: bool,
}

impl IndexerOptions {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            page_size: DEFAULT_PAGE_SIZE,
            verbose: false,
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.output.join(SNAPSHOT_FILE_NAME)
    }
}

/// 生成结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub output: PathBuf,
    pub bytes: usize,
    pub posts: usize,
    pub tags: usize,
    pub services: usize,
    pub has_portfolio: bool,
    /// 按给定每页条数计算的首页总页数
    pub total_pages: usize,
}

fn is_export_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("ndjson") | Some("json")
    )
}

/// 收集导出文件，按路径排序
pub fn collect_sources(source: &Path) -> Result<Vec<PathBuf>, IndexerError> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| IndexerError::Io {
            path: source.display().to_string(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_export_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(IndexerError::NoSources(source.display().to_string()));
    }
    Ok(files)
}

/// 读取所有导出文件
pub fn load_dataset(files: &[PathBuf]) -> Result<Dataset, IndexerError> {
    let mut dataset = Dataset::new();
    for path in files {
        let text = fs::read_to_string(path).map_err(|source| IndexerError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let count = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ndjson") => dataset.load_ndjson(&text, path)?,
            _ => dataset.load_json(&text, path)?,
        };
        debug!("读取 {}: {} 个文档", path.display(), count);
    }
    Ok(dataset)
}

fn log_read_times(snapshot: &ContentSnapshot) {
    for post in &snapshot.posts {
        debug!(
            slug = %post.slug,
            minutes = estimate_minutes(post.content.as_deref()),
            "阅读时间"
        );
    }
}

/// 生成快照：读取、解析引用、校验并写出压缩文件
pub fn generate_snapshot(options: &IndexerOptions) -> Result<IndexReport, IndexerError> {
    let start_time = Instant::now();

    let files = collect_sources(&options.source)?;
    info!("找到 {} 个导出文件", files.len());

    let dataset = load_dataset(&files)?;
    let stats = dataset.stats();
    info!(
        posts = stats.posts,
        tags = stats.tags,
        authors = stats.authors,
        assets = stats.assets,
        skipped_drafts = stats.skipped_drafts,
        ignored = stats.ignored,
        "数据集读取完成"
    );

    let snapshot = dataset.resolve()?.build()?;
    if options.verbose {
        log_read_times(&snapshot);
    }

    let query = ListingQuery {
        page_size: options.page_size,
        ..ListingQuery::default()
    };
    let total_pages = derive_view(&snapshot.posts, &snapshot.tags, &query).total_pages;

    fs::create_dir_all(&options.output).map_err(|source| IndexerError::Io {
        path: options.output.display().to_string(),
        source,
    })?;
    let output = options.snapshot_path();
    let bytes = write_snapshot(&snapshot, &output)?;

    info!("快照生成完成！耗时: {:.2}秒", start_time.elapsed().as_secs_f32());

    Ok(IndexReport {
        output,
        bytes,
        posts: snapshot.posts.len(),
        tags: snapshot.tags.len(),
        services: snapshot.services.len(),
        has_portfolio: snapshot.portfolio.is_some(),
        total_pages,
    })
}
