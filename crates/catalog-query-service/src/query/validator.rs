//! 结果校验
//!
//! 关联外键已设置、但关联记录未能加载的书籍被剔除，不抛错。

use tracing::debug;

use catalog_shared::observability::metrics;

use crate::models::RankedBook;

pub struct ResultValidator;

impl ResultValidator {
    /// 保持原有顺序，剔除存在悬空关联的记录
    pub fn filter(records: Vec<RankedBook>) -> Vec<RankedBook> {
        let before = records.len();
        let kept: Vec<RankedBook> = records
            .into_iter()
            .filter(|record| {
                let dangling = record.dangling_relations();
                if dangling.is_empty() {
                    return true;
                }
                debug!(book_id = record.id(), relations = ?dangling, "Dropping book with dangling relations");
                false
            })
            .collect();

        let rejected = before - kept.len();
        if rejected > 0 {
            metrics::record_rejected(rejected);
        }
        kept
    }
}
