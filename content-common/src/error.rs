use thiserror::Error;

/// 内容数据校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("{doc_type} `{id}` 缺少必填字段 `{field}`")]
    MissingField {
        doc_type: String,
        id: String,
        field: &'static str,
    },

    #[error("{doc_type} `{id}` 的 slug `{slug}` 不是合法的URL片段，可以改为 `{suggestion}`")]
    InvalidSlug {
        doc_type: String,
        id: String,
        slug: String,
        suggestion: String,
    },

    #[error("{doc_type} `{id}` 的 slug 超过 {max} 个字符")]
    SlugTooLong {
        doc_type: String,
        id: String,
        max: usize,
    },

    #[error("{doc_type} slug `{slug}` 重复出现")]
    DuplicateSlug { doc_type: String, slug: String },

    #[error("文档ID `{0}` 重复出现")]
    DuplicateId(String),

    #[error("{doc_type} `{id}` 的字段 `{field}` 引用了不存在的文档 `{target}`")]
    DanglingReference {
        doc_type: String,
        id: String,
        field: &'static str,
        target: String,
    },

    #[error("作品集 `{0}` 至少需要一行图片")]
    EmptyPortfolio(String),

    #[error("作品集 `{id}` 的 {row_type} 需要 {expected} 张图片, 实际 {actual} 张")]
    PortfolioRowImages {
        id: String,
        row_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("作品集 `{id}` 包含未知的行类型 `{row_type}`")]
    UnknownPortfolioRow { id: String, row_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_document() {
        let err = ContentError::DuplicateSlug {
            doc_type: "blogPost".to_string(),
            slug: "soft-minimalism".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("blogPost"));
        assert!(display.contains("soft-minimalism"));

        let err = ContentError::PortfolioRowImages {
            id: "portfolio".to_string(),
            row_type: "portfolioRowThree".to_string(),
            expected: 3,
            actual: 2,
        };
        assert!(format!("{err}").contains("portfolioRowThree"));
    }
}
