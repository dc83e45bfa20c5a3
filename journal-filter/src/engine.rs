use std::ops::RangeInclusive;

use content_common::models::{Post, Tag};

use crate::models::{ListingQuery, ListingView, SortOrder};

/// 计算列表页视图
///
/// 1. 头图文章取调用方传入序列的第一篇（调用方保证按发布时间降序），不受筛选影响
/// 2. 按标签slug筛选
/// 3. 按发布时间稳定排序，缺失日期按纪元处理
/// 4. 从网格中排除头图文章
/// 5. 分页，总页数至少为1，超出范围的页码返回空列表
pub fn derive_view<'a>(posts: &'a [Post], tags: &'a [Tag], query: &ListingQuery) -> ListingView<'a> {
    let featured = select_featured(posts);

    let mut grid = filter_by_tag(posts, query.selected_tag.as_deref());
    sort_posts(&mut grid, query.sort);
    if let Some(featured) = featured {
        grid.retain(|post| post.id != featured.id);
    }

    let page_size = query.page_size.max(1);
    let total = grid.len();

    ListingView {
        featured,
        page_items: page_slice(&grid, query.page, page_size).to_vec(),
        total,
        page: query.page,
        page_size,
        total_pages: total_pages(total, page_size),
        tags,
    }
}

/// 头图文章 - 序列中的第一篇
pub fn select_featured(posts: &[Post]) -> Option<&Post> {
    posts.first()
}

/// 按标签slug筛选，`None` 或空字符串时保留全部
pub fn filter_by_tag<'a>(posts: &'a [Post], tag_slug: Option<&str>) -> Vec<&'a Post> {
    match tag_slug.filter(|slug| !slug.is_empty()) {
        Some(slug) => posts.iter().filter(|post| post.has_tag(slug)).collect(),
        None => posts.iter().collect(),
    }
}

/// 按发布时间排序
pub fn sort_posts(posts: &mut [&Post], sort: SortOrder) {
    match sort {
        SortOrder::Oldest => posts.sort_by_key(|post| post.sort_timestamp()),
        SortOrder::Newest => posts.sort_by(|a, b| b.sort_timestamp().cmp(&a.sort_timestamp())),
    }
}

/// 总页数，至少为1
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// 取出指定页的切片，页码从1开始
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = match page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(page_size))
    {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// 分页按钮的页码
pub fn page_numbers(total_pages: usize) -> RangeInclusive<usize> {
    1..=total_pages.max(1)
}

/// 只有一页时不显示分页控件
pub fn shows_pagination(total_pages: usize) -> bool {
    total_pages > 1
}

/// 按slug查找文章
pub fn find_by_slug<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|post| post.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use content_common::models::{AuthorRef, TagRef};

    fn post(id: usize, days_ago: Option<i64>, tags: &[&str]) -> Post {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Post {
            id: format!("post-{id}"),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            excerpt: "Layered rooms, slowly.".to_string(),
            published_at: days_ago.map(|d| now - Duration::days(d)),
            featured_image: None,
            author: AuthorRef {
                name: "Avery Lane".to_string(),
                image: None,
            },
            tags: tags
                .iter()
                .map(|slug| TagRef {
                    title: slug.to_string(),
                    slug: slug.to_string(),
                })
                .collect(),
            content: None,
        }
    }

    /// n篇文章，按发布时间降序
    fn corpus(n: usize) -> Vec<Post> {
        (0..n).map(|i| post(i, Some(i as i64), &[])).collect()
    }

    fn ids<'a>(posts: &[&'a Post]) -> Vec<&'a str> {
        posts.iter().map(|post| post.id.as_str()).collect()
    }

    fn query(tag: Option<&str>, sort: SortOrder, page: usize, page_size: usize) -> ListingQuery {
        ListingQuery {
            selected_tag: tag.map(str::to_string),
            sort,
            page,
            page_size,
        }
    }

    #[test]
    fn empty_corpus_has_one_empty_page() {
        let view = derive_view(&[], &[], &ListingQuery::default());
        assert!(view.featured.is_none());
        assert!(view.page_items.is_empty());
        assert_eq!(view.total, 0);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn featured_is_first_and_never_in_grid() {
        let posts = corpus(12);
        for page in 1..=3 {
            for sort in [SortOrder::Newest, SortOrder::Oldest] {
                let view = derive_view(&posts, &[], &query(None, sort, page, 4));
                assert_eq!(view.featured.map(|p| p.id.as_str()), Some("post-0"));
                assert!(view.page_items.iter().all(|p| p.id != "post-0"));
            }
        }
    }

    #[test]
    fn featured_trusts_caller_order() {
        let posts = vec![post(1, Some(30), &[]), post(2, Some(1), &[])];
        let view = derive_view(&posts, &[], &ListingQuery::default());
        assert_eq!(view.featured.map(|p| p.id.as_str()), Some("post-1"));
        assert_eq!(ids(&view.page_items), vec!["post-2"]);
    }

    #[test]
    fn total_pages_counts_posts_after_excluding_featured() {
        for n in [1usize, 2, 9, 10, 11, 19, 20, 28, 29] {
            let posts = corpus(n);
            let view = derive_view(&posts, &[], &query(None, SortOrder::Newest, 1, 9));
            assert_eq!(view.total, n - 1);
            assert_eq!(view.total_pages, (n - 1).div_ceil(9).max(1), "n = {n}");
        }

        assert_eq!(derive_view(&corpus(10), &[], &query(None, SortOrder::Newest, 1, 9)).total_pages, 1);
        assert_eq!(derive_view(&corpus(20), &[], &query(None, SortOrder::Newest, 1, 9)).total_pages, 3);
    }

    #[test]
    fn pages_slice_the_sorted_grid() {
        let posts = corpus(20);
        let first = derive_view(&posts, &[], &query(None, SortOrder::Newest, 1, 9));
        assert_eq!(first.page_items.len(), 9);
        assert_eq!(first.page_items[0].id, "post-1");

        let last = derive_view(&posts, &[], &query(None, SortOrder::Newest, 3, 9));
        assert_eq!(ids(&last.page_items), vec!["post-19"]);

        let oldest = derive_view(&posts, &[], &query(None, SortOrder::Oldest, 1, 9));
        assert_eq!(oldest.page_items[0].id, "post-19");
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let posts = corpus(5);
        for page in [0, 2, 50, usize::MAX] {
            let view = derive_view(&posts, &[], &query(None, SortOrder::Newest, page, 9));
            assert!(view.page_items.is_empty(), "page = {page}");
            assert_eq!(view.total_pages, 1);
        }

        let view = derive_view(&posts, &[], &query(None, SortOrder::Newest, 2, usize::MAX));
        assert!(view.page_items.is_empty());
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let posts = corpus(4);
        let view = derive_view(&posts, &[], &query(None, SortOrder::Newest, 2, 0));
        assert_eq!(view.page_size, 1);
        assert_eq!(view.total_pages, 3);
        assert_eq!(ids(&view.page_items), vec!["post-2"]);
    }

    #[test]
    fn tag_filter_matches_slug() {
        let posts = vec![
            post(0, Some(0), &["styling"]),
            post(1, Some(1), &["renovation", "styling"]),
            post(2, Some(2), &["renovation"]),
            post(3, Some(3), &[]),
            post(4, Some(4), &["styling"]),
        ];
        let view = derive_view(&posts, &[], &query(Some("styling"), SortOrder::Newest, 1, 9));
        assert_eq!(ids(&view.page_items), vec!["post-1", "post-4"]);

        let view = derive_view(&posts, &[], &query(Some("renovation"), SortOrder::Oldest, 1, 9));
        assert_eq!(ids(&view.page_items), vec!["post-2", "post-1"]);

        let view = derive_view(&posts, &[], &query(Some(""), SortOrder::Newest, 1, 9));
        assert_eq!(view.total, 4);
    }

    #[test]
    fn unused_tag_keeps_featured_and_empties_grid() {
        let posts = vec![post(0, Some(0), &["styling"]), post(1, Some(1), &["styling"])];
        let unfiltered = derive_view(&posts, &[], &ListingQuery::default());
        let view = derive_view(&posts, &[], &query(Some("kitchens"), SortOrder::Newest, 1, 9));
        assert!(view.page_items.is_empty());
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.featured, unfiltered.featured);
    }

    #[test]
    fn sort_reverses_dated_posts_and_keeps_undated_order() {
        let posts = vec![
            post(0, Some(0), &[]),
            post(1, None, &[]),
            post(2, Some(5), &[]),
            post(3, None, &[]),
            post(4, Some(2), &[]),
        ];
        let newest = derive_view(&posts, &[], &query(None, SortOrder::Newest, 1, 9));
        assert_eq!(ids(&newest.page_items), vec!["post-4", "post-2", "post-1", "post-3"]);

        let oldest = derive_view(&posts, &[], &query(None, SortOrder::Oldest, 1, 9));
        assert_eq!(ids(&oldest.page_items), vec!["post-1", "post-3", "post-2", "post-4"]);
    }

    #[test]
    fn content_order_is_untouched() {
        use content_common::models::ContentBlock;
        let mut first = post(0, Some(0), &[]);
        let mut second = post(1, Some(1), &[]);
        let blocks = vec![
            ContentBlock::heading(2, "Start"),
            ContentBlock::paragraph("middle"),
            ContentBlock::paragraph("end"),
        ];
        first.content = Some(blocks.clone());
        second.content = Some(blocks.clone());
        let posts = vec![first, second];
        let view = derive_view(&posts, &[], &ListingQuery::default());
        assert_eq!(view.page_items[0].content.as_ref(), Some(&blocks));
    }

    #[test]
    fn pagination_helpers() {
        assert_eq!(page_numbers(3).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(page_numbers(0).collect::<Vec<_>>(), vec![1]);
        assert!(!shows_pagination(1));
        assert!(shows_pagination(2));
        assert_eq!(total_pages(0, 9), 1);
        assert_eq!(total_pages(18, 9), 2);
        assert_eq!(total_pages(19, 9), 3);
    }

    #[test]
    fn lookup_by_slug() {
        let posts = corpus(3);
        assert_eq!(find_by_slug(&posts, "post-2").map(|p| p.id.as_str()), Some("post-2"));
        assert!(find_by_slug(&posts, "missing").is_none());
    }

    #[test]
    fn tags_are_echoed_for_the_filter_bar() {
        let tags = vec![Tag {
            id: "tag-1".to_string(),
            title: "Styling".to_string(),
            slug: "styling".to_string(),
        }];
        let view = derive_view(&[], &tags, &ListingQuery::default());
        assert_eq!(view.tags, tags.as_slice());
    }
}
