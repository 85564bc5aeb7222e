use crate::types::{MemoryState, ScheduleError, MAX_QUALITY, MIN_QUALITY};

/// 截断质量评分到 [0, 5]
///
/// 越界值 (包括 ±∞) 被截断，只有 NaN 视为调用方错误
pub fn clamp_quality(quality: f64) -> Result<f64, ScheduleError> {
    if quality.is_nan() {
        return Err(ScheduleError::InvalidQuality("quality is NaN".to_string()));
    }
    Ok(quality.clamp(MIN_QUALITY, MAX_QUALITY))
}

/// 校验记忆状态
///
/// 计数字段由 u32 保证非负，这里只需检查难度因子。
/// 低于下限的有限值照常参与更新，由更新后的下限截断
pub fn validate_state(state: &MemoryState) -> Result<(), ScheduleError> {
    let ef = state.easiness_factor;
    if !ef.is_finite() {
        return Err(ScheduleError::InvalidState(format!(
            "easinessFactor must be finite, got {ef}"
        )));
    }
    Ok(())
}
