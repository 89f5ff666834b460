//! 集成测试公共设施
//!
//! `InMemoryCatalog` 同时实现分类与书籍仓储接口，按计划对象的语义在内存中求值，
//! 并统计每类查询的执行次数

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::lorem::en::{Sentence, Words};
use fake::faker::name::en::Name;
use tokio::sync::RwLock;

use catalog_query::error::Result;
use catalog_query::models::{
    Book, BookMetrics, Category, CategoryKind, CategorySubject, Placeholder, Priority, RankedRow,
    Review, User,
};
use catalog_query::query::{
    BoundedReviewQuery, InclusionSet, PartnerScope, PremiumBooksFilter, RankingPlan,
};
use catalog_query::repository::{BookRepositoryTrait, CategoryRepositoryTrait};
use catalog_query::CatalogQueryService;
use catalog_shared::cache::{CacheStore, MemoryCache};
use catalog_shared::config::RankingConfig;
use catalog_shared::error::{CatalogError, Result as CacheResult};

// ==================== 测试数据 ====================

/// 书籍种子，未指定的字段使用可通过排行过滤的默认值
#[derive(Debug, Clone)]
pub struct BookSeed {
    pub category_id: i64,
    pub title: Option<String>,
    pub user_id: Option<i64>,
    pub publisher_id: i64,
    pub published_by: Option<i64>,
    pub editor_id: Option<i64>,
    pub is_premium: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub followers: i64,
    pub readers: i64,
}

impl BookSeed {
    pub fn new(category_id: i64) -> Self {
        Self {
            category_id,
            title: None,
            user_id: None,
            publisher_id: PARTNER_PUBLISHER,
            published_by: None,
            editor_id: None,
            is_premium: false,
            published_at: Some(Utc::now() - chrono::Duration::days(1)),
            created_at: Utc::now(),
            priority: Priority::Medium,
            followers: 0,
            readers: 500,
        }
    }

    pub fn ranked(mut self, priority: Priority, followers: i64) -> Self {
        self.priority = priority;
        self.followers = followers;
        self
    }

    pub fn readers(mut self, readers: i64) -> Self {
        self.readers = readers;
        self
    }

    pub fn publisher(mut self, publisher_id: i64) -> Self {
        self.publisher_id = publisher_id;
        self
    }

    pub fn published_by(mut self, user_id: i64) -> Self {
        self.published_by = Some(user_id);
        self
    }

    pub fn editor(mut self, user_id: i64) -> Self {
        self.editor_id = Some(user_id);
        self
    }

    pub fn owned_by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn premium(mut self) -> Self {
        self.is_premium = true;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published_at = None;
        self.published_by = None;
        self
    }

    pub fn published_in_future(mut self) -> Self {
        self.published_at = Some(Utc::now() + chrono::Duration::days(1));
        self
    }

    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.created_at = Utc::now() - chrono::Duration::minutes(minutes);
        self
    }
}

/// 默认种子使用的合作出版社
pub const PARTNER_PUBLISHER: i64 = 1;
/// 非合作出版社
pub const OTHER_PUBLISHER: i64 = 2;

// ==================== 查询计数 ====================

#[derive(Debug, Default)]
pub struct QueryCounters {
    pub subject: AtomicUsize,
    pub criteria: AtomicUsize,
    pub ranked: AtomicUsize,
    pub count: AtomicUsize,
    pub by_ids: AtomicUsize,
    pub partners: AtomicUsize,
    pub users: AtomicUsize,
    pub reviews: AtomicUsize,
    pub review_rows: AtomicUsize,
    pub placeholders: AtomicUsize,
    pub premium: AtomicUsize,
}

impl QueryCounters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn hit(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// ==================== 内存仓储 ====================

#[derive(Default)]
struct CatalogState {
    next_id: i64,
    users: HashMap<i64, User>,
    categories: HashMap<i64, Category>,
    engagements: HashMap<i64, i64>,
    partners: HashMap<i64, bool>,
    books: HashMap<i64, Book>,
    metrics: HashMap<i64, BookMetrics>,
    reviews: Vec<Review>,
    placeholders: Vec<(Option<i64>, Placeholder)>,
}

impl CatalogState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn ranked_rows(&self, plan: &RankingPlan) -> Vec<RankedRow> {
        let mut rows: Vec<RankedRow> = self
            .books
            .values()
            .filter(|book| book.category_id == plan.category_id)
            .filter(|book| book.is_published(plan.as_of))
            .filter_map(|book| {
                let metrics = self.metrics.get(&book.id)?;
                Some(RankedRow {
                    book: book.clone(),
                    metrics: metrics.clone(),
                })
            })
            .filter(|row| row.metrics.readers > plan.min_readers)
            .filter(|row| self.included(&plan.inclusion, row.book.publisher_id))
            .collect();

        rows.sort_by(|a, b| {
            a.metrics
                .priority
                .rank()
                .cmp(&b.metrics.priority.rank())
                .then(b.metrics.followers.cmp(&a.metrics.followers))
                .then(a.book.id.cmp(&b.book.id))
        });
        rows
    }

    fn included(&self, inclusion: &InclusionSet, publisher_id: i64) -> bool {
        match inclusion {
            InclusionSet::SubQuery(scope) => self
                .partners
                .get(&publisher_id)
                .is_some_and(|active| *active || !scope.active_only),
            materialized => materialized.contains(publisher_id).unwrap_or(false),
        }
    }
}

/// 内存书目库
#[derive(Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
    pub counters: QueryCounters,
}

impl InMemoryCatalog {
    /// 预置一家处于合作期的出版社 `PARTNER_PUBLISHER`
    pub fn new() -> Arc<Self> {
        let mut state = CatalogState::default();
        state.partners.insert(PARTNER_PUBLISHER, true);
        Arc::new(Self {
            state: RwLock::new(state),
            counters: QueryCounters::default(),
        })
    }

    pub async fn add_user(&self) -> User {
        let mut state = self.state.write().await;
        let user = User {
            id: state.next_id(),
            name: Name().fake(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_category(
        &self,
        kind: CategoryKind,
        archived: bool,
        editor: Option<&User>,
    ) -> Category {
        let mut state = self.state.write().await;
        let label: Vec<String> = Words(1..3).fake();
        let category = Category {
            id: state.next_id(),
            label: label.join(" "),
            kind,
            is_archived: archived,
            editor_id: editor.map(|u| u.id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.categories.insert(category.id, category.clone());
        category
    }

    /// 已达标的普通分类
    pub async fn add_ranked_category(&self, points: i64) -> Category {
        let category = self.add_category(CategoryKind::Standard, false, None).await;
        self.add_engagement(category.id, points).await;
        category
    }

    pub async fn add_engagement(&self, category_id: i64, points: i64) {
        let mut state = self.state.write().await;
        *state.engagements.entry(category_id).or_default() += points;
    }

    pub async fn set_partner(&self, publisher_id: i64, active: bool) {
        self.state.write().await.partners.insert(publisher_id, active);
    }

    pub async fn add_book(&self, seed: BookSeed) -> Book {
        let mut state = self.state.write().await;
        let book = Book {
            id: state.next_id(),
            title: seed.title.unwrap_or_else(|| Sentence(2..4).fake()),
            category_id: seed.category_id,
            user_id: seed.user_id,
            publisher_id: seed.publisher_id,
            published_by: seed.published_by,
            editor_id: seed.editor_id,
            is_premium: seed.is_premium,
            published_at: seed.published_at,
            created_at: seed.created_at,
            updated_at: seed.created_at,
        };
        state.metrics.insert(
            book.id,
            BookMetrics {
                priority: seed.priority,
                followers: seed.followers,
                readers: seed.readers,
            },
        );
        state.books.insert(book.id, book.clone());
        book
    }

    pub async fn rename_book(&self, book_id: i64, title: &str) {
        let mut state = self.state.write().await;
        if let Some(book) = state.books.get_mut(&book_id) {
            book.title = title.to_string();
            book.updated_at = Utc::now();
        }
    }

    pub async fn delete_book(&self, book_id: i64) {
        let mut state = self.state.write().await;
        state.books.remove(&book_id);
        state.metrics.remove(&book_id);
        state.reviews.retain(|r| r.book_id != book_id);
    }

    pub async fn add_reviews(&self, book_id: i64, count: usize) {
        let mut state = self.state.write().await;
        for minutes in 0..count {
            let review = Review {
                id: state.next_id(),
                book_id,
                reviewer_name: Name().fake(),
                rating: (1..6).fake::<i16>(),
                body: Sentence(3..8).fake(),
                created_at: Utc::now() - chrono::Duration::minutes(minutes as i64),
            };
            state.reviews.push(review);
        }
    }

    pub async fn add_placeholder(&self, category_id: Option<i64>, title: &str) -> Placeholder {
        let mut state = self.state.write().await;
        let placeholder = Placeholder {
            id: Some(state.next_id()),
            title: title.to_string(),
            subtitle: None,
            cover_url: None,
        };
        state.placeholders.push((category_id, placeholder.clone()));
        placeholder
    }
}

#[async_trait]
impl CategoryRepositoryTrait for InMemoryCatalog {
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        QueryCounters::hit(&self.counters.subject);
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn get_subject(&self, id: i64) -> Result<Option<CategorySubject>> {
        QueryCounters::hit(&self.counters.subject);
        let state = self.state.read().await;
        Ok(state.categories.get(&id).map(|category| {
            let editor = category
                .editor_id
                .and_then(|editor_id| state.users.get(&editor_id).cloned());
            CategorySubject::new(category.clone(), editor)
        }))
    }

    async fn sum_engagement_points(&self, category_id: i64) -> Result<i64> {
        QueryCounters::hit(&self.counters.criteria);
        let state = self.state.read().await;
        Ok(state.engagements.get(&category_id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl BookRepositoryTrait for InMemoryCatalog {
    async fn fetch_ranked(&self, plan: &RankingPlan) -> Result<Vec<RankedRow>> {
        QueryCounters::hit(&self.counters.ranked);
        let mut rows = self.state.read().await.ranked_rows(plan);
        rows.truncate(plan.limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_ranked(&self, plan: &RankingPlan) -> Result<i64> {
        QueryCounters::hit(&self.counters.count);
        Ok(self.state.read().await.ranked_rows(plan).len() as i64)
    }

    async fn get_ranked_by_ids(&self, ids: &[i64]) -> Result<Vec<RankedRow>> {
        QueryCounters::hit(&self.counters.by_ids);
        let state = self.state.read().await;
        // 故意打乱顺序，调用方需要自行恢复
        let mut rows: Vec<RankedRow> = ids
            .iter()
            .filter_map(|id| {
                Some(RankedRow {
                    book: state.books.get(id)?.clone(),
                    metrics: state.metrics.get(id)?.clone(),
                })
            })
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn list_partner_publisher_ids(&self, scope: PartnerScope) -> Result<Vec<i64>> {
        QueryCounters::hit(&self.counters.partners);
        let state = self.state.read().await;
        let mut ids: Vec<i64> = state
            .partners
            .iter()
            .filter(|(_, active)| **active || !scope.active_only)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        QueryCounters::hit(&self.counters.users);
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn fetch_bounded_reviews(&self, query: &BoundedReviewQuery) -> Result<Vec<Review>> {
        if query.is_noop() {
            return Ok(Vec::new());
        }
        QueryCounters::hit(&self.counters.reviews);

        let state = self.state.read().await;
        let mut rows = Vec::new();
        for book_id in &query.book_ids {
            let mut reviews: Vec<Review> = state
                .reviews
                .iter()
                .filter(|r| r.book_id == *book_id)
                .cloned()
                .collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            reviews.truncate(query.per_book_limit as usize);
            rows.extend(reviews);
        }

        self.counters.review_rows.fetch_add(rows.len(), Ordering::SeqCst);
        Ok(rows)
    }

    async fn list_placeholders(&self, category_id: i64) -> Result<Vec<Placeholder>> {
        QueryCounters::hit(&self.counters.placeholders);
        let state = self.state.read().await;
        let scoped = state
            .placeholders
            .iter()
            .filter(|(owner, _)| *owner == Some(category_id));
        let global = state.placeholders.iter().filter(|(owner, _)| owner.is_none());
        Ok(scoped.chain(global).map(|(_, p)| p.clone()).collect())
    }

    async fn list_premium_books(&self, filter: &PremiumBooksFilter) -> Result<Vec<Book>> {
        QueryCounters::hit(&self.counters.premium);
        let state = self.state.read().await;
        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| b.category_id == filter.category_id)
            .filter(|b| b.published_at.is_some() && b.is_premium())
            .filter(|b| !filter.orphaned_only || b.is_orphaned())
            .cloned()
            .collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        books.truncate(filter.limit.max(0) as usize);
        Ok(books)
    }
}

// ==================== 缓存 ====================

/// 统计读写次数的内存缓存
#[derive(Default)]
pub struct CountingCache {
    inner: MemoryCache,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
}

impl CountingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).await.ok().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value, ttl).await
    }
}

/// 始终不可用的缓存
pub struct UnavailableCache;

#[async_trait]
impl CacheStore for UnavailableCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CatalogError::Redis(redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))))
    }

    async fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Err(CatalogError::Redis(redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))))
    }
}

// ==================== 服务构造 ====================

pub type TestService = CatalogQueryService<InMemoryCatalog, InMemoryCatalog>;

pub fn create_service(
    catalog: &Arc<InMemoryCatalog>,
    cache: Arc<dyn CacheStore>,
    config: RankingConfig,
) -> TestService {
    CatalogQueryService::new(catalog.clone(), catalog.clone(), cache, config)
}
