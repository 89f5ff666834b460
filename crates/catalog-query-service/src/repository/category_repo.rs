//! 分类仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::CategoryRepositoryTrait;
use crate::error::Result;
use crate::models::{Category, CategorySubject, User};

/// 分类 + 左连接的编辑列
#[derive(sqlx::FromRow)]
struct SubjectRow {
    #[sqlx(flatten)]
    category: Category,
    editor_user_id: Option<i64>,
    editor_name: Option<String>,
}

impl From<SubjectRow> for CategorySubject {
    fn from(row: SubjectRow) -> Self {
        let editor = match (row.editor_user_id, row.editor_name) {
            (Some(id), Some(name)) => Some(User { id, name }),
            _ => None,
        };
        CategorySubject::new(row.category, editor)
    }
}

pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, label, kind, is_archived, editor_id, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// 获取查询主体
    ///
    /// 编辑通过 LEFT JOIN 一并取出，编辑记录缺失时 editor 为 None
    pub async fn get_subject(&self, id: i64) -> Result<Option<CategorySubject>> {
        let row = sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT c.id, c.label, c.kind, c.is_archived, c.editor_id, c.created_at, c.updated_at,
                   u.id AS editor_user_id, u.name AS editor_name
            FROM categories c
            LEFT JOIN users u ON u.id = c.editor_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CategorySubject::from))
    }

    pub async fn sum_engagement_points(&self, category_id: i64) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(points), 0)::BIGINT
            FROM category_engagements
            WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.get_category(id).await
    }

    async fn get_subject(&self, id: i64) -> Result<Option<CategorySubject>> {
        self.get_subject(id).await
    }

    async fn sum_engagement_points(&self, category_id: i64) -> Result<i64> {
        self.sum_engagement_points(category_id).await
    }
}
