//! Shape checks for incoming entities. Nothing here touches storage:
//! existence of referenced rows is checked in [`crate::api::references`].

use crate::error::{AppError, AppResult, Problems};

pub mod blog;
pub mod comment;
pub mod user;

pub trait Validate {
    /// Field name → problem description. Empty means valid.
    fn valid(&self) -> Problems;
}

/// Turn a non-empty problem map into a 400 carrying the map as its body.
pub fn ensure_valid<T: Validate>(entity: &T) -> AppResult<()> {
    let problems = entity.valid();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Problems(problems))
    }
}

/// Record `"<field> is required"` when `value` is blank. Returns whether it was present.
fn require_text(problems: &mut Problems, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        problems.insert(field.to_string(), format!("{} is required", field));
        return false;
    }
    true
}

fn require_id(problems: &mut Problems, field: &str, value: i64) {
    if value <= 0 {
        problems.insert(field.to_string(), format!("{} is required", field));
    }
}

fn max_chars(problems: &mut Problems, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        problems.insert(
            field.to_string(),
            format!("{} cannot exceed {} characters", field, max),
        );
    }
}
