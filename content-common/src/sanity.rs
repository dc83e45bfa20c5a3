//! CMS原始文档到内容模型的转换
//!
//! 覆盖两种数据形态：页面查询返回的投影结果（引用已展开），
//! 以及数据集导出中的原始文档（引用为 `_ref`）。

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ContentError;
use crate::models::{
    AuthorRef, BlockStyle, ContentBlock, Dimensions, ImageRef, PortfolioRow, Post, Span, Tag,
    TagRef, TextBlock,
};

/// slug 字段: `{ "current": "..." }`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawSlug {
    #[serde(default)]
    pub current: Option<String>,
}

impl RawSlug {
    pub fn into_string(self) -> String {
        self.current.unwrap_or_default()
    }
}

/// 引用字段，未展开时只有 `_ref`，展开后带 `_id`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawReference {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

impl RawReference {
    /// 被引用文档的ID
    pub fn target(&self) -> Option<&str> {
        self.reference.as_deref().or(self.id.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct RawDimensions {
    width: f64,
    height: f64,
}

/// 图片资源元数据 (`asset -> metadata`)
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawImageMetadata {
    #[serde(default)]
    pub lqip: Option<String>,
    #[serde(default)]
    dimensions: Option<RawDimensions>,
}

impl RawImageMetadata {
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions.and_then(|d| {
            if d.width.is_finite() && d.height.is_finite() && d.width >= 0.0 && d.height >= 0.0 {
                Some(Dimensions {
                    width: d.width.round() as u32,
                    height: d.height.round() as u32,
                })
            } else {
                None
            }
        })
    }
}

/// 图片字段
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawImage {
    #[serde(default)]
    pub asset: Option<RawReference>,
    #[serde(default)]
    pub metadata: Option<RawImageMetadata>,
}

impl RawImage {
    /// 没有资源引用的图片视为不存在
    pub fn into_image_ref(self) -> Option<ImageRef> {
        let asset_ref = self.asset.as_ref()?.target()?.to_string();
        let metadata = self.metadata.unwrap_or_default();
        Some(ImageRef {
            asset_ref,
            dimensions: metadata.dimensions(),
            lqip: metadata.lqip,
        })
    }
}

/// 从JSON值中解析图片，格式不符时返回 `None`
pub fn image_from_value(value: Option<&Value>) -> Option<ImageRef> {
    let value = value?;
    serde_json::from_value::<RawImage>(value.clone())
        .ok()
        .and_then(RawImage::into_image_ref)
}

/// 解析发布时间，无法解析时返回 `None`
pub fn parse_published_at(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn type_name(value: &Value) -> String {
    string_field(value, "_type").unwrap_or_default()
}

impl ContentBlock {
    /// 将CMS中的一个块转换为内容块
    ///
    /// 不认识的类型或缺少必填字段的块都会变成 `Unknown`，不会失败。
    pub fn from_value(value: &Value) -> ContentBlock {
        let kind = type_name(value);
        let parsed = match kind.as_str() {
            "block" => text_block_from_value(value),
            "blockQuote" => string_field(value, "quote").map(|quote| ContentBlock::BlockQuote {
                quote,
                author: string_field(value, "author"),
                citation: string_field(value, "citation"),
                content: nested_blocks(value),
            }),
            "fullWidthImage" => image_from_value(value.get("image")).map(|image| {
                ContentBlock::FullWidthImage {
                    image,
                    alt: string_field(value, "alt"),
                    caption: string_field(value, "caption"),
                    content: nested_blocks(value),
                }
            }),
            "twoImages" => match (
                image_from_value(value.get("imageOne")),
                image_from_value(value.get("imageTwo")),
            ) {
                (Some(image_one), Some(image_two)) => Some(ContentBlock::TwoImages {
                    image_one,
                    alt_one: string_field(value, "altOne"),
                    image_two,
                    alt_two: string_field(value, "altTwo"),
                    caption: string_field(value, "caption"),
                    content: nested_blocks(value),
                }),
                _ => None,
            },
            _ => None,
        };

        parsed.unwrap_or_else(|| ContentBlock::Unknown {
            type_name: kind,
            content: nested_blocks(value),
        })
    }
}

/// 块自带的 `content` 子块
fn nested_blocks(value: &Value) -> Vec<ContentBlock> {
    value
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| blocks_from_values(blocks))
        .unwrap_or_default()
}

fn text_block_from_value(value: &Value) -> Option<ContentBlock> {
    let children = value.get("children")?.as_array()?;
    let style = value
        .get("style")
        .and_then(Value::as_str)
        .map(BlockStyle::parse)
        .unwrap_or_default();

    let spans = children
        .iter()
        .filter_map(|child| {
            let text = child.get("text")?.as_str()?;
            let marks = child
                .get("marks")
                .and_then(Value::as_array)
                .map(|marks| {
                    marks
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(Span {
                text: text.to_string(),
                marks,
            })
        })
        .collect();

    Some(ContentBlock::Text(TextBlock {
        style,
        children: spans,
        content: nested_blocks(value),
    }))
}

/// 转换块数组，保持原有顺序
pub fn blocks_from_values(values: &[Value]) -> Vec<ContentBlock> {
    values.iter().map(ContentBlock::from_value).collect()
}

/// 作品集行转换，图片数量必须与行类型匹配
pub fn portfolio_row_from_value(portfolio_id: &str, value: &Value) -> Result<PortfolioRow, ContentError> {
    let row_type = type_name(value);
    let images: Vec<ImageRef> = match row_type.as_str() {
        "portfolioRowOne" => image_from_value(value.get("image")).into_iter().collect(),
        "portfolioRowTwo" | "portfolioRowThree" => value
            .get("images")
            .and_then(Value::as_array)
            .map(|images| images.iter().filter_map(|image| image_from_value(Some(image))).collect())
            .unwrap_or_default(),
        _ => {
            return Err(ContentError::UnknownPortfolioRow {
                id: portfolio_id.to_string(),
                row_type: row_type.clone(),
            })
        }
    };

    let expected = match row_type.as_str() {
        "portfolioRowOne" => 1,
        "portfolioRowTwo" => 2,
        _ => 3,
    };
    let mismatch = |actual: usize| ContentError::PortfolioRowImages {
        id: portfolio_id.to_string(),
        row_type: row_type.clone(),
        expected,
        actual,
    };

    let actual = images.len();
    let mut images = images.into_iter();
    match (expected, images.next(), images.next(), images.next(), images.next()) {
        (1, Some(image), None, None, None) => Ok(PortfolioRow::One { image }),
        (2, Some(a), Some(b), None, None) => Ok(PortfolioRow::Two { images: [a, b] }),
        (3, Some(a), Some(b), Some(c), None) => Ok(PortfolioRow::Three { images: [a, b, c] }),
        _ => Err(mismatch(actual)),
    }
}

/// 查询结果中的作者（已展开）
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawQueryAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<RawImage>,
}

/// 查询结果中的标签引用（已展开）
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawQueryTagRef {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<RawSlug>,
}

/// 列表页查询返回的文章
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawQueryPost {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<RawSlug>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub featured_image: Option<RawImage>,
    #[serde(default)]
    pub author: Option<RawQueryAuthor>,
    /// 展开失败的引用会是 null
    #[serde(default)]
    pub tags: Option<Vec<Option<RawQueryTagRef>>>,
    #[serde(default)]
    pub content: Option<Vec<Value>>,
}

impl RawQueryPost {
    pub fn into_post(self) -> Post {
        let author = self.author.unwrap_or_default();
        Post {
            id: self.id,
            title: self.title.unwrap_or_default(),
            slug: self.slug.map(RawSlug::into_string).unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            published_at: parse_published_at(self.published_at.as_deref()),
            featured_image: self.featured_image.and_then(RawImage::into_image_ref),
            author: AuthorRef {
                name: author.name.unwrap_or_default(),
                image: author.image.and_then(RawImage::into_image_ref),
            },
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(|tag| TagRef {
                    title: tag.title.unwrap_or_default(),
                    slug: tag.slug.map(RawSlug::into_string).unwrap_or_default(),
                })
                .collect(),
            content: self.content.map(|blocks| blocks_from_values(&blocks)),
        }
    }
}

/// 标签查询结果
#[derive(Deserialize, Debug, Clone)]
pub struct RawQueryTag {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<RawSlug>,
}

impl RawQueryTag {
    pub fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            title: self.title.unwrap_or_default(),
            slug: self.slug.map(RawSlug::into_string).unwrap_or_default(),
        }
    }
}

/// 解析列表页的文章查询结果，null 视为空列表
pub fn posts_from_query_json(json: &str) -> Result<Vec<Post>, serde_json::Error> {
    let raw: Option<Vec<RawQueryPost>> = serde_json::from_str(json)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(RawQueryPost::into_post)
        .collect())
}

/// 解析标签查询结果，null 视为空列表
pub fn tags_from_query_json(json: &str) -> Result<Vec<Tag>, serde_json::Error> {
    let raw: Option<Vec<RawQueryTag>> = serde_json::from_str(json)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(RawQueryTag::into_tag)
        .collect())
}
