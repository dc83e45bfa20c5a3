use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use content_common::error::ContentError;
use content_common::models::{
    Author, ContentBlock, ImageRef, Portfolio, PortfolioRow, Post, Service, Tag,
};
use content_common::sanity::{
    blocks_from_values, parse_published_at, portfolio_row_from_value, RawImage,
    RawImageMetadata, RawQueryAuthor, RawQueryTag, RawReference, RawSlug,
};
use journal_filter::builder::SnapshotBuilder;

use crate::IndexerError;

/// 导出文件中的文章文档（引用未展开）
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawExportPost {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<RawSlug>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    featured_image: Option<RawImage>,
    #[serde(default)]
    author: Option<RawReference>,
    #[serde(default)]
    tags: Option<Vec<RawReference>>,
    #[serde(default)]
    content: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawExportService {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<Vec<Value>>,
    #[serde(default)]
    order_rank: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawExportPortfolio {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    rows: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug)]
struct RawExportAsset {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    metadata: Option<RawImageMetadata>,
}

/// 数据集 - 按类型分组的导出文档
#[derive(Default)]
pub struct Dataset {
    posts: Vec<RawExportPost>,
    tags: HashMap<String, Tag>,
    tag_order: Vec<String>,
    authors: HashMap<String, Author>,
    assets: HashMap<String, RawImageMetadata>,
    services: Vec<RawExportService>,
    portfolios: Vec<RawExportPortfolio>,
    skipped_drafts: usize,
    ignored: usize,
}

/// 数据集统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetStats {
    pub posts: usize,
    pub tags: usize,
    pub authors: usize,
    pub assets: usize,
    pub services: usize,
    pub portfolios: usize,
    pub skipped_drafts: usize,
    pub ignored: usize,
}

fn parse_error(path: &Path, line: usize, source: serde_json::Error) -> IndexerError {
    IndexerError::Parse {
        path: path.display().to_string(),
        line,
        source,
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            posts: self.posts.len(),
            tags: self.tags.len(),
            authors: self.authors.len(),
            assets: self.assets.len(),
            services: self.services.len(),
            portfolios: self.portfolios.len(),
            skipped_drafts: self.skipped_drafts,
            ignored: self.ignored,
        }
    }

    /// 读取NDJSON导出（每行一个文档），返回读取的文档数
    pub fn load_ndjson(&mut self, text: &str, path: &Path) -> Result<usize, IndexerError> {
        let mut count = 0;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let document: Value =
                serde_json::from_str(line).map_err(|e| parse_error(path, index + 1, e))?;
            self.add_document(document)
                .map_err(|e| parse_error(path, index + 1, e))?;
            count += 1;
        }
        Ok(count)
    }

    /// 读取JSON导出（文档数组或单个文档），返回读取的文档数
    pub fn load_json(&mut self, text: &str, path: &Path) -> Result<usize, IndexerError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            let line = e.line();
            parse_error(path, line, e)
        })?;
        let documents = match value {
            Value::Array(documents) => documents,
            document => vec![document],
        };

        let count = documents.len();
        for (index, document) in documents.into_iter().enumerate() {
            self.add_document(document)
                .map_err(|source| IndexerError::Document {
                    path: path.display().to_string(),
                    index: index + 1,
                    source,
                })?;
        }
        Ok(count)
    }

    /// 添加一个文档，按 `_type` 分组，草稿和不相关的类型会被跳过
    pub fn add_document(&mut self, document: Value) -> Result<(), serde_json::Error> {
        let id = document.get("_id").and_then(Value::as_str).unwrap_or_default();
        if id.starts_with("drafts.") {
            self.skipped_drafts += 1;
            return Ok(());
        }

        let doc_type = document
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match doc_type.as_str() {
            "blogPost" => self.posts.push(serde_json::from_value(document)?),
            "tag" => {
                let tag = serde_json::from_value::<RawQueryTag>(document)?.into_tag();
                if self.tags.insert(tag.id.clone(), tag.clone()).is_none() {
                    self.tag_order.push(tag.id);
                }
            }
            "author" => {
                let id = id.to_string();
                let raw: RawQueryAuthor = serde_json::from_value(document)?;
                self.authors.insert(
                    id.clone(),
                    Author {
                        id,
                        name: raw.name.unwrap_or_default(),
                        image: raw.image.and_then(RawImage::into_image_ref),
                    },
                );
            }
            "sanity.imageAsset" => {
                let asset: RawExportAsset = serde_json::from_value(document)?;
                self.assets
                    .insert(asset.id, asset.metadata.unwrap_or_default());
            }
            "service" => self.services.push(serde_json::from_value(document)?),
            "portfolio" => self.portfolios.push(serde_json::from_value(document)?),
            other => {
                debug!("跳过文档类型: {}", other);
                self.ignored += 1;
            }
        }
        Ok(())
    }

    /// 用资源文档中的元数据补全图片引用
    fn enrich_image(&self, image: &mut ImageRef) {
        if let Some(metadata) = self.assets.get(&image.asset_ref) {
            if image.lqip.is_none() {
                image.lqip = metadata.lqip.clone();
            }
            if image.dimensions.is_none() {
                image.dimensions = metadata.dimensions();
            }
        }
    }

    fn enrich_blocks(&self, blocks: &mut [ContentBlock]) {
        for block in blocks {
            let content = match block {
                ContentBlock::FullWidthImage { image, content, .. } => {
                    self.enrich_image(image);
                    content
                }
                ContentBlock::TwoImages {
                    image_one,
                    image_two,
                    content,
                    ..
                } => {
                    self.enrich_image(image_one);
                    self.enrich_image(image_two);
                    content
                }
                ContentBlock::Text(text) => &mut text.content,
                ContentBlock::BlockQuote { content, .. } | ContentBlock::Unknown { content, .. } => {
                    content
                }
            };
            self.enrich_blocks(content);
        }
    }

    fn resolve_image(&self, raw: Option<RawImage>) -> Option<ImageRef> {
        let mut image = raw.and_then(RawImage::into_image_ref)?;
        self.enrich_image(&mut image);
        Some(image)
    }

    fn resolve_post(&self, raw: RawExportPost, errors: &mut Vec<ContentError>) -> Option<Post> {
        let author = match raw.author.as_ref().and_then(RawReference::target) {
            None => {
                errors.push(ContentError::MissingField {
                    doc_type: "blogPost".to_string(),
                    id: raw.id.clone(),
                    field: "author",
                });
                return None;
            }
            Some(target) => match self.authors.get(target) {
                Some(author) => {
                    let mut author = author.to_ref();
                    if let Some(image) = author.image.as_mut() {
                        self.enrich_image(image);
                    }
                    author
                }
                None => {
                    errors.push(ContentError::DanglingReference {
                        doc_type: "blogPost".to_string(),
                        id: raw.id.clone(),
                        field: "author",
                        target: target.to_string(),
                    });
                    return None;
                }
            },
        };

        let tags = raw
            .tags
            .unwrap_or_default()
            .iter()
            .filter_map(|reference| {
                let target = reference.target()?;
                match self.tags.get(target) {
                    Some(tag) => Some(tag.to_ref()),
                    None => {
                        warn!("文章 {} 引用了不存在的标签 {}，已忽略", raw.id, target);
                        None
                    }
                }
            })
            .collect();

        let content = raw.content.map(|values| {
            let mut blocks = blocks_from_values(&values);
            self.enrich_blocks(&mut blocks);
            blocks
        });

        Some(Post {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            slug: raw.slug.map(RawSlug::into_string).unwrap_or_default(),
            excerpt: raw.excerpt.unwrap_or_default(),
            published_at: parse_published_at(raw.published_at.as_deref()),
            featured_image: self.resolve_image(raw.featured_image),
            author,
            tags,
            content,
        })
    }

    fn resolve_portfolio(&self, raw: RawExportPortfolio, errors: &mut Vec<ContentError>) -> Option<Portfolio> {
        let mut rows = Vec::new();
        let mut failed = false;
        for value in raw.rows.unwrap_or_default() {
            match portfolio_row_from_value(&raw.id, &value) {
                Ok(mut row) => {
                    match &mut row {
                        PortfolioRow::One { image } => self.enrich_image(image),
                        PortfolioRow::Two { images } => {
                            images.iter_mut().for_each(|image| self.enrich_image(image))
                        }
                        PortfolioRow::Three { images } => {
                            images.iter_mut().for_each(|image| self.enrich_image(image))
                        }
                    }
                    rows.push(row);
                }
                Err(error) => {
                    errors.push(error);
                    failed = true;
                }
            }
        }

        if failed {
            None
        } else {
            Some(Portfolio { id: raw.id, rows })
        }
    }

    /// 解析引用并生成快照构建器
    ///
    /// 作者引用缺失、作品集行不合法等错误会全部收集后一起返回。
    pub fn resolve(mut self) -> Result<SnapshotBuilder, IndexerError> {
        let mut errors = Vec::new();
        let mut builder = SnapshotBuilder::new();

        for id in &self.tag_order {
            if let Some(tag) = self.tags.get(id) {
                builder.add_tag(tag.clone());
            }
        }

        let posts = std::mem::take(&mut self.posts);
        let services = std::mem::take(&mut self.services);
        let portfolios = std::mem::take(&mut self.portfolios);

        for raw in posts {
            if let Some(post) = self.resolve_post(raw, &mut errors) {
                builder.add_post(post);
            }
        }

        for raw in services {
            let mut description = blocks_from_values(&raw.description.unwrap_or_default());
            self.enrich_blocks(&mut description);
            builder.add_service(Service {
                id: raw.id,
                title: raw.title.unwrap_or_default(),
                description,
                order_rank: raw.order_rank,
            });
        }

        for raw in portfolios {
            if let Some(portfolio) = self.resolve_portfolio(raw, &mut errors) {
                builder.set_portfolio(portfolio);
            }
        }

        if errors.is_empty() {
            Ok(builder)
        } else {
            Err(IndexerError::Content(errors))
        }
    }
}
