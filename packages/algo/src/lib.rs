//! # recall-algo - 间隔重复调度核心库
//!
//! 本 crate 提供纯 Rust 实现的 SM-2 复习调度:
//!
//! - **SM-2 Scheduler** - 根据答题质量更新记忆状态与下次复习时间
//! - **Quality Mapping** - 将答题结果 (正误、提示、用时) 转换为 0-5 质量评分
//! - **Review Queue** - 到期项目的优先级排序与每日学习计划
//! - **Statistics** - 掌握程度分布与导出快照
//!
//! ## 设计理念
//!
//! - **无 I/O** - 所有函数都是纯函数，时间由调用方传入
//! - **输入容错** - 质量评分越界时截断到 [0, 5]，而不是报错
//! - **输入校验** - 状态字段缺失或非法时返回 [`ScheduleError`]
//!
//! ## 模块结构
//!
//! - [`sm2`] - SM-2 状态转移与派生查询 (是否到期、优先级、掌握程度)
//! - [`quality`] - 质量评分换算
//! - [`queue`] - 复习队列 (下一个复习项、学习计划)
//! - [`stats`] - 学习统计与导出
//! - [`sanitize`] - 边界输入校验
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::Utc;
//! use recall_algo::{quality_from_outcome, schedule, MemoryState};
//!
//! let now = Utc::now();
//! let state = MemoryState::new(now);
//! let quality = quality_from_outcome(true, 0, Some(4_000));
//! let next = schedule(&state, quality.into(), now).unwrap();
//! assert_eq!(next.repetitions, 1);
//! assert_eq!(next.interval_days, 1);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod quality;
pub mod queue;
pub mod sanitize;
pub mod sm2;
pub mod stats;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出 SM-2 调度器
pub use sm2::{
    hours_until_review, is_due, mastery_level, mastery_percent, overdue_days, priority, schedule,
    schedule_batch,
};

/// 重新导出质量评分换算
pub use quality::{
    quality_from_accuracy, quality_from_confidence, quality_from_outcome, Confidence,
    ParseConfidenceError,
};

/// 重新导出复习队列
pub use queue::{pick_next, rank_due, study_plan, LastReview, NextItem, ReviewEntry, StudyPlan};

/// 重新导出统计
pub use stats::{snapshot, study_stats, ReviewSnapshot, StudyStats};
