use crate::shared::errors::AppError;

pub struct Validator;

impl Validator {
    pub fn validate_tmdb_id(id: i64) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::ValidationError(format!(
                "TMDB id must be positive, got {}",
                id
            )));
        }
        Ok(())
    }

    pub fn validate_season(season: i32) -> Result<(), AppError> {
        if season < 0 {
            return Err(AppError::ValidationError(
                "Season number cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_episode_number(number: i32) -> Result<(), AppError> {
        if number < 0 {
            return Err(AppError::ValidationError(
                "Episode number cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_plays(plays: i32) -> Result<(), AppError> {
        if plays < 0 {
            return Err(AppError::ValidationError(
                "Play count cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_title(title: &str) -> Result<(), AppError> {
        if title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if title.len() > 255 {
            return Err(AppError::ValidationError(
                "Title too long (max 255 characters)".to_string(),
            ));
        }
        Ok(())
    }
}
