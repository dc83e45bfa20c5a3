use std::cmp::Ordering;

use crate::models::{Post, Service, Tag};

/// 文章按发布时间降序排列（稳定排序，缺失日期按纪元处理）
pub fn sort_posts_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.sort_timestamp().cmp(&a.sort_timestamp()));
}

/// 标签按标题升序排列
pub fn sort_tags_by_title(tags: &mut [Tag]) {
    tags.sort_by(|a, b| a.title.cmp(&b.title));
}

/// 服务按排名字符串升序排列，没有排名的放在最后
pub fn sort_services_by_rank(services: &mut [Service]) {
    services.sort_by(|a, b| match (&a.order_rank, &b.order_rank) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorRef;
    use chrono::{TimeZone, Utc};

    fn service(id: &str, rank: Option<&str>) -> Service {
        Service {
            id: id.to_string(),
            title: id.to_string(),
            description: Vec::new(),
            order_rank: rank.map(str::to_string),
        }
    }

    #[test]
    fn services_follow_rank_with_unranked_last() {
        let mut services = vec![
            service("styling", None),
            service("consult", Some("0|i0000f:")),
            service("design", Some("0|hzzzzz:")),
            service("refresh", None),
        ];
        sort_services_by_rank(&mut services);
        let ids: Vec<&str> = services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["design", "consult", "styling", "refresh"]);
    }

    #[test]
    fn posts_newest_first_with_undated_last() {
        let post = |id: &str, day: Option<u32>| Post {
            id: id.to_string(),
            title: id.to_string(),
            slug: id.to_string(),
            excerpt: String::new(),
            published_at: day.map(|d| Utc.with_ymd_and_hms(2025, 1, d, 8, 0, 0).unwrap()),
            featured_image: None,
            author: AuthorRef::default(),
            tags: Vec::new(),
            content: None,
        };
        let mut posts = vec![post("a", Some(3)), post("draft", None), post("b", Some(10))];
        sort_posts_newest_first(&mut posts);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "draft"]);
    }

    #[test]
    fn tags_sorted_alphabetically() {
        let tag = |title: &str| Tag {
            id: title.to_lowercase(),
            title: title.to_string(),
            slug: title.to_lowercase(),
        };
        let mut tags = vec![tag("Styling"), tag("Design"), tag("Renovation")];
        sort_tags_by_title(&mut tags);
        let titles: Vec<&str> = tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Design", "Renovation", "Styling"]);
    }
}
