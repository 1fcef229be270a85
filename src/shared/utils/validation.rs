use chrono::NaiveDate;

use crate::shared::config::ScoreBounds;
use crate::shared::errors::{StoreError, StoreResult};

pub struct Validator;

impl Validator {
    pub fn validate_required(field: &str, value: &str) -> StoreResult<()> {
        if value.is_empty() {
            return Err(StoreError::validation(format!("{} cannot be empty", field)));
        }
        Ok(())
    }

    pub fn validate_score(field: &str, value: i16, bounds: &ScoreBounds) -> StoreResult<()> {
        if !bounds.contains(value) {
            return Err(StoreError::validation(format!(
                "{} must be between {} and {}, got {}",
                field, bounds.min, bounds.max, value
            )));
        }
        Ok(())
    }

    /// Start and end may each be absent; when both are present the
    /// window must not run backwards. Equal days are a valid window.
    pub fn validate_date_window(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> StoreResult<()> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(StoreError::validation(format!(
                    "end_day {} precedes start_day {}",
                    end, start
                )));
            }
        }
        Ok(())
    }

    pub fn validate_page_limit(limit: usize, max: usize) -> StoreResult<()> {
        if limit == 0 {
            return Err(StoreError::validation("Limit must be positive"));
        }
        if limit > max {
            return Err(StoreError::validation(format!("Limit cannot exceed {}", max)));
        }
        Ok(())
    }
}
