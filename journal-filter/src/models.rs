use serde::{Deserialize, Serialize};
use content_common::models::{Post, Tag};

/// 每页显示的文章数
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// 排序方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// 按发布时间降序
    #[default]
    Newest,
    /// 按发布时间升序
    Oldest,
}

impl SortOrder {
    /// 解析排序参数，无法识别时默认按最新排序
    pub fn parse(value: &str) -> Self {
        match value {
            "oldest" => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }
}

/// 列表查询参数 - 客户端传递的筛选条件
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// 标签slug，为空时不筛选
    #[serde(default)]
    pub selected_tag: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    /// 当前页码，从1开始
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            selected_tag: None,
            sort: SortOrder::Newest,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// 列表视图 - 渲染列表页所需的全部数据
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingView<'a> {
    /// 头图文章（未筛选列表的第一篇）
    pub featured: Option<&'a Post>,
    /// 当前页的文章
    pub page_items: Vec<&'a Post>,
    /// 筛选并排除头图文章后的总数
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    /// 总页数，至少为1
    pub total_pages: usize,
    /// 筛选栏使用的标签
    pub tags: &'a [Tag],
}

/// 列表页状态
///
/// 切换标签或排序方式时页码回到第1页。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingState {
    selected_tag: Option<String>,
    sort: SortOrder,
    current_page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            selected_tag: None,
            sort: SortOrder::Newest,
            current_page: 1,
        }
    }
}

impl ListingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// 选择标签，`None` 或空字符串表示全部
    pub fn select_tag(&mut self, slug: Option<&str>) {
        let slug = slug.filter(|s| !s.is_empty()).map(str::to_string);
        if slug != self.selected_tag {
            self.selected_tag = slug;
            self.current_page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        if sort != self.sort {
            self.sort = sort;
            self.current_page = 1;
        }
    }

    /// 跳转到指定页，页码不会小于1
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// 下一页，不超过总页数
    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.saturating_add(1).min(total_pages.max(1));
    }

    /// 上一页，不小于1
    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, total_pages: usize) -> bool {
        self.current_page < total_pages
    }

    /// 生成当前状态对应的查询参数
    pub fn query(&self, page_size: usize) -> ListingQuery {
        ListingQuery {
            selected_tag: self.selected_tag.clone(),
            sort: self.sort,
            page: self.current_page,
            page_size,
        }
    }
}

/// 默认页码
fn default_page() -> usize {
    1
}

/// 默认每页条数
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
