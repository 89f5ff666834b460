//! 空状态
//!
//! 排行结果为空（门槛未达标、没有符合条件的书籍、全部被校验剔除）时的替换策略

use std::sync::Arc;

use catalog_shared::config::{EmptyStateConfig, EmptyStateStrategy};
use catalog_shared::observability::metrics;
use tracing::{debug, warn};

use super::context::QueryContext;
use crate::error::Result;
use crate::models::{Placeholder, RankedEntry};
use crate::repository::BookRepositoryTrait;

pub struct EmptyStateProvider<BR: BookRepositoryTrait> {
    book_repo: Arc<BR>,
    config: EmptyStateConfig,
}

impl<BR: BookRepositoryTrait> EmptyStateProvider<BR> {
    pub fn new(book_repo: Arc<BR>, config: EmptyStateConfig) -> Self {
        Self { book_repo, config }
    }

    pub fn strategy(&self) -> EmptyStateStrategy {
        self.config.strategy
    }

    /// 生成空状态条目，`None` 策略返回空列表
    pub async fn provide(&self, ctx: &QueryContext) -> Result<Vec<RankedEntry>> {
        let entries = match self.config.strategy {
            EmptyStateStrategy::None => Vec::new(),
            EmptyStateStrategy::Static => match &self.config.placeholder {
                Some(placeholder) => vec![RankedEntry::Placeholder(Placeholder {
                    id: None,
                    title: placeholder.title.clone(),
                    subtitle: placeholder.subtitle.clone(),
                    cover_url: placeholder.cover_url.clone(),
                })],
                None => {
                    warn!("Static empty state configured without a placeholder");
                    Vec::new()
                }
            },
            EmptyStateStrategy::Stored => self
                .book_repo
                .list_placeholders(ctx.category_id())
                .await?
                .into_iter()
                .map(RankedEntry::Placeholder)
                .collect(),
        };

        let label = strategy_label(self.config.strategy);
        debug!(strategy = label, count = entries.len(), "Empty state provided");
        metrics::record_empty_state(label);
        Ok(entries)
    }
}

fn strategy_label(strategy: EmptyStateStrategy) -> &'static str {
    match strategy {
        EmptyStateStrategy::None => "none",
        EmptyStateStrategy::Static => "static",
        EmptyStateStrategy::Stored => "stored",
    }
}
