use wasm_bindgen::prelude::*;
use serde::Serialize;
use web_sys::console;

use content_common::compression::from_compressed;
use content_common::models::{ContentSnapshot, Post, Tag};
use content_common::read_time::estimate_minutes;
use content_common::sanity::{posts_from_query_json, tags_from_query_json};

pub mod builder;
pub mod engine;
pub mod models;

pub use engine::{derive_view, find_by_slug};
pub use models::{ListingQuery, ListingState, ListingView, SortOrder, DEFAULT_PAGE_SIZE};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 文章卡片 - 列表中的一篇文章及其阅读时间
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostCard<'a> {
    pub post: &'a Post,
    pub read_minutes: u32,
}

impl<'a> PostCard<'a> {
    pub fn new(post: &'a Post) -> Self {
        Self {
            post,
            read_minutes: estimate_minutes(post.content.as_deref()),
        }
    }
}

/// 列表页渲染数据
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JournalPage<'a> {
    pub featured: Option<PostCard<'a>>,
    pub items: Vec<PostCard<'a>>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub show_pagination: bool,
    pub page_numbers: Vec<usize>,
    pub tags: &'a [Tag],
}

impl<'a> From<ListingView<'a>> for JournalPage<'a> {
    fn from(view: ListingView<'a>) -> Self {
        Self {
            featured: view.featured.map(PostCard::new),
            items: view.page_items.into_iter().map(PostCard::new).collect(),
            total: view.total,
            page: view.page,
            page_size: view.page_size,
            total_pages: view.total_pages,
            show_pagination: engine::shows_pagination(view.total_pages),
            page_numbers: engine::page_numbers(view.total_pages).collect(),
            tags: view.tags,
        }
    }
}

/// 日志输出到浏览器控制台
fn log_error(message: &str) {
    console::error_1(&JsValue::from_str(message));
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

/// 文章列表JS接口 - 提供给JavaScript使用的列表API
///
/// 数据和列表状态都保存在实例中。
#[wasm_bindgen]
pub struct JournalFilterJS {
    snapshot: ContentSnapshot,
    state: ListingState,
    page_size: usize,
}

impl JournalFilterJS {
    fn with_snapshot(snapshot: ContentSnapshot) -> Self {
        Self {
            snapshot,
            state: ListingState::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn current_view(&self) -> ListingView<'_> {
        derive_view(
            &self.snapshot.posts,
            &self.snapshot.tags,
            &self.state.query(self.page_size),
        )
    }

    fn total_pages(&self) -> usize {
        self.current_view().total_pages
    }
}

#[wasm_bindgen]
impl JournalFilterJS {
    /// 从索引工具生成的压缩快照创建
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &[u8]) -> Result<JournalFilterJS, JsValue> {
        let snapshot = from_compressed::<ContentSnapshot>(data).map_err(|e| {
            let message = format!("解析快照失败: {}", e);
            log_error(&message);
            JsValue::from_str(&message)
        })?;
        Ok(Self::with_snapshot(snapshot))
    }

    /// 从页面查询结果创建，文章需按发布时间降序
    #[wasm_bindgen(js_name = fromQueryJson)]
    pub fn from_query_json(posts_json: &str, tags_json: &str) -> Result<JournalFilterJS, JsValue> {
        let posts = posts_from_query_json(posts_json)
            .map_err(|e| JsValue::from_str(&format!("解析文章失败: {}", e)))?;
        let tags = tags_from_query_json(tags_json)
            .map_err(|e| JsValue::from_str(&format!("解析标签失败: {}", e)))?;

        let mut snapshot = ContentSnapshot::empty();
        snapshot.posts = posts;
        snapshot.tags = tags;
        Ok(Self::with_snapshot(snapshot))
    }

    #[wasm_bindgen(js_name = setPageSize)]
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// 获取所有标签
    pub fn tags(&self) -> Result<JsValue, JsValue> {
        to_js(&self.snapshot.tags)
    }

    #[wasm_bindgen(js_name = selectTag)]
    pub fn select_tag(&mut self, slug: Option<String>) {
        self.state.select_tag(slug.as_deref());
    }

    #[wasm_bindgen(js_name = setSort)]
    pub fn set_sort(&mut self, sort: &str) {
        self.state.set_sort(SortOrder::parse(sort));
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: usize) {
        self.state.go_to_page(page);
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) {
        let total_pages = self.total_pages();
        self.state.next_page(total_pages);
    }

    #[wasm_bindgen(js_name = prevPage)]
    pub fn prev_page(&mut self) {
        self.state.prev_page();
    }

    /// 当前状态对应的列表页数据
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&JournalPage::from(self.current_view()))
    }

    /// 按JSON查询参数计算列表页，不改变实例状态
    pub fn filter(&self, query_json: &str) -> Result<JsValue, JsValue> {
        let query: ListingQuery = serde_json::from_str(query_json)
            .map_err(|e| JsValue::from_str(&format!("解析参数失败: {}", e)))?;
        let view = derive_view(&self.snapshot.posts, &self.snapshot.tags, &query);
        to_js(&JournalPage::from(view))
    }

    /// 文章详情
    #[wasm_bindgen(js_name = postBySlug)]
    pub fn post_by_slug(&self, slug: &str) -> Result<JsValue, JsValue> {
        match find_by_slug(&self.snapshot.posts, slug) {
            Some(post) => to_js(&PostCard::new(post)),
            None => Ok(JsValue::NULL),
        }
    }

    /// 阅读时间（分钟），找不到文章时返回0
    #[wasm_bindgen(js_name = readTime)]
    pub fn read_time(&self, slug: &str) -> u32 {
        find_by_slug(&self.snapshot.posts, slug)
            .map(|post| estimate_minutes(post.content.as_deref()))
            .unwrap_or(0)
    }
}
