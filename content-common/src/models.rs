use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 图片尺寸（像素）
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// 图片引用 - 指向CMS中的图片资源
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ImageRef {
    /// 资源ID，例如 image-abc123-800x600-jpg
    pub asset_ref: String,
    /// 低质量占位图 (LQIP，base64 data URL)
    pub lqip: Option<String>,
    /// 像素尺寸
    pub dimensions: Option<Dimensions>,
}

impl ImageRef {
    /// 仅包含资源ID的图片引用
    pub fn new(asset_ref: impl Into<String>) -> Self {
        Self {
            asset_ref: asset_ref.into(),
            lqip: None,
            dimensions: None,
        }
    }
}

/// 作者引用 - 文章中内嵌的作者信息
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AuthorRef {
    pub name: String,
    pub image: Option<ImageRef>,
}

/// 作者文档
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub image: Option<ImageRef>,
}

impl Author {
    pub fn to_ref(&self) -> AuthorRef {
        AuthorRef {
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// 标签引用 - 文章中内嵌的标签（标题 + slug）
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TagRef {
    pub title: String,
    pub slug: String,
}

/// 标签文档
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// 标签唯一标识符
    pub id: String,
    /// 显示名称
    pub title: String,
    /// URL安全的唯一标识
    pub slug: String,
}

impl Tag {
    pub fn to_ref(&self) -> TagRef {
        TagRef {
            title: self.title.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// 文本块样式
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum BlockStyle {
    #[default]
    Normal,
    /// 标题，1-6级
    Heading(u8),
    Blockquote,
    /// 其他自定义样式，保留原始名称
    Other(String),
}

impl BlockStyle {
    pub fn parse(style: &str) -> Self {
        match style {
            "" | "normal" => BlockStyle::Normal,
            "blockquote" => BlockStyle::Blockquote,
            s if s.len() == 2 && s.starts_with('h') => match s[1..].parse::<u8>() {
                Ok(level) if (1..=6).contains(&level) => BlockStyle::Heading(level),
                _ => BlockStyle::Other(s.to_string()),
            },
            s => BlockStyle::Other(s.to_string()),
        }
    }
}

/// 富文本中的一个文本片段
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// 标记（strong、em 或 markDef 的 key）
    pub marks: Vec<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }
}

/// 段落或标题
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub style: BlockStyle,
    pub children: Vec<Span>,
    /// 子块
    pub content: Vec<ContentBlock>,
}

impl TextBlock {
    /// 所有片段拼接后的纯文本
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

/// 内容块 - 文章正文的一个结构化单元
///
/// 无法识别或字段不完整的块统一落入 `Unknown`。
/// 任何块带有的 `content` 数组都会作为子块保留下来。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ContentBlock {
    Text(TextBlock),
    BlockQuote {
        quote: String,
        author: Option<String>,
        citation: Option<String>,
        content: Vec<ContentBlock>,
    },
    FullWidthImage {
        image: ImageRef,
        alt: Option<String>,
        caption: Option<String>,
        content: Vec<ContentBlock>,
    },
    TwoImages {
        image_one: ImageRef,
        alt_one: Option<String>,
        image_two: ImageRef,
        alt_two: Option<String>,
        caption: Option<String>,
        content: Vec<ContentBlock>,
    },
    Unknown {
        type_name: String,
        content: Vec<ContentBlock>,
    },
}

impl ContentBlock {
    /// 普通段落
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            style: BlockStyle::Normal,
            children: vec![Span::plain(text)],
            content: Vec::new(),
        })
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            style: BlockStyle::Heading(level),
            children: vec![Span::plain(text)],
            content: Vec::new(),
        })
    }

    /// 块内携带的子块序列
    pub fn nested(&self) -> &[ContentBlock] {
        match self {
            ContentBlock::Text(text) => &text.content,
            ContentBlock::BlockQuote { content, .. }
            | ContentBlock::FullWidthImage { content, .. }
            | ContentBlock::TwoImages { content, .. }
            | ContentBlock::Unknown { content, .. } => content,
        }
    }
}

/// 博客文章
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    /// 文章唯一标识符
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// 发布时间，可能为空
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: Option<ImageRef>,
    pub author: AuthorRef,
    /// 标签列表，顺序即显示顺序
    pub tags: Vec<TagRef>,
    /// 正文内容块，`None` 表示文档没有正文字段
    pub content: Option<Vec<ContentBlock>>,
}

impl Post {
    /// 是否带有指定slug的标签
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|tag| tag.slug == slug)
    }

    /// 排序用的时间戳（毫秒），缺失日期按纪元处理
    pub fn sort_timestamp(&self) -> i64 {
        self.published_at
            .map(|date| date.timestamp_millis())
            .unwrap_or(0)
    }
}

/// 服务项目
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: Vec<ContentBlock>,
    /// 可排序文档列表生成的排名字符串
    pub order_rank: Option<String>,
}

/// 作品集中的一行图片
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum PortfolioRow {
    One { image: ImageRef },
    Two { images: [ImageRef; 2] },
    Three { images: [ImageRef; 3] },
}

impl PortfolioRow {
    pub fn images(&self) -> &[ImageRef] {
        match self {
            PortfolioRow::One { image } => std::slice::from_ref(image),
            PortfolioRow::Two { images } => images,
            PortfolioRow::Three { images } => images,
        }
    }
}

/// 作品集文档
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Portfolio {
    pub id: String,
    pub rows: Vec<PortfolioRow>,
}

/// 内容快照 - 索引工具输出、前端模块加载的全部数据
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentSnapshot {
    /// 按发布时间降序排列的文章
    pub posts: Vec<Post>,
    /// 按标题升序排列的标签
    pub tags: Vec<Tag>,
    /// 按排名排列的服务
    pub services: Vec<Service>,
    pub portfolio: Option<Portfolio>,
    /// 快照生成时间
    pub generated_at: DateTime<Utc>,
}

impl ContentSnapshot {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            tags: Vec::new(),
            services: Vec::new(),
            portfolio: None,
            generated_at: Utc::now(),
        }
    }
}
