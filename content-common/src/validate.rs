use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ContentError;
use crate::models::ContentSnapshot;

/// slug 最大长度，与CMS中 slug 字段的 maxLength 一致
pub const MAX_SLUG_LEN: usize = 96;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("non-word pattern is valid"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("separator pattern is valid"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("dash pattern is valid"));

/// 由标题生成 slug
///
/// 转小写，去掉ASCII字母数字以外的字符，空白和下划线替换为 `-`，
/// 合并连续的 `-`，截断到 [`MAX_SLUG_LEN`]。结果总能通过 [`is_valid_slug`]，
/// 除非标题里没有任何ASCII字母数字。
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    let dashed = SEPARATORS.replace_all(&stripped, "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    collapsed
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// slug 是否为URL安全的格式
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

fn check_slug(doc_type: &str, id: &str, slug: &str, errors: &mut Vec<ContentError>) {
    if slug.is_empty() {
        errors.push(ContentError::MissingField {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            field: "slug",
        });
    } else if slug.chars().count() > MAX_SLUG_LEN {
        errors.push(ContentError::SlugTooLong {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            max: MAX_SLUG_LEN,
        });
    } else if !is_valid_slug(slug) {
        errors.push(ContentError::InvalidSlug {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            slug: slug.to_string(),
            suggestion: slugify(slug),
        });
    }
}

fn check_required(doc_type: &str, id: &str, field: &'static str, value: &str, errors: &mut Vec<ContentError>) {
    if value.trim().is_empty() {
        errors.push(ContentError::MissingField {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            field,
        });
    }
}

/// 校验快照中的数据约束，返回全部错误
pub fn validate_snapshot(snapshot: &ContentSnapshot) -> Result<(), Vec<ContentError>> {
    let mut errors = Vec::new();

    let mut post_ids = HashSet::new();
    let mut post_slugs = HashSet::new();
    for post in &snapshot.posts {
        if !post_ids.insert(post.id.as_str()) {
            errors.push(ContentError::DuplicateId(post.id.clone()));
        }
        check_required("blogPost", &post.id, "title", &post.title, &mut errors);
        check_required("blogPost", &post.id, "excerpt", &post.excerpt, &mut errors);
        check_required("blogPost", &post.id, "author", &post.author.name, &mut errors);
        check_slug("blogPost", &post.id, &post.slug, &mut errors);
        if !post.slug.is_empty() && !post_slugs.insert(post.slug.as_str()) {
            errors.push(ContentError::DuplicateSlug {
                doc_type: "blogPost".to_string(),
                slug: post.slug.clone(),
            });
        }
    }

    let mut tag_slugs = HashSet::new();
    for tag in &snapshot.tags {
        check_required("tag", &tag.id, "title", &tag.title, &mut errors);
        check_slug("tag", &tag.id, &tag.slug, &mut errors);
        if !tag.slug.is_empty() && !tag_slugs.insert(tag.slug.as_str()) {
            errors.push(ContentError::DuplicateSlug {
                doc_type: "tag".to_string(),
                slug: tag.slug.clone(),
            });
        }
    }

    if let Some(portfolio) = &snapshot.portfolio {
        if portfolio.rows.is_empty() {
            errors.push(ContentError::EmptyPortfolio(portfolio.id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
