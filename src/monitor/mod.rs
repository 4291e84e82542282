//! 统计监视器
//!
//! 时间加权、逐样本和分类监视器。
//! 均可禁用后再启用，不会丢失已记录的历史。

mod level;
mod summary;
mod tally;
mod timeline;

pub use level::LevelMonitor;
pub use summary::{LevelStats, LevelSummary, TallyStats, TallySummary};
pub use tally::TallyMonitor;
pub use timeline::CategoryTimeline;
