use super::ApiError;

/// A query parameter that must be present and non-blank.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(message))
}

pub fn validate_page(page: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = page.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(1);
    };

    match raw.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError::validation(format!(
            "Invalid page: {}. Page must be a positive integer",
            raw
        ))),
    }
}

pub fn validate_season(season: &str) -> Result<i32, ApiError> {
    match season.trim().parse::<i32>() {
        Ok(season) if season >= 0 => Ok(season),
        _ => Err(ApiError::validation(format!(
            "Invalid season: {}. Season must be a non-negative integer",
            season
        ))),
    }
}

pub fn validate_anilist_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid AniList ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required(Some(" a1 "), "Anime ID required").unwrap(), "a1");
        assert!(required(Some("  "), "Anime ID required").is_err());
        assert!(required(None, "Anime ID required").is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some("3")).unwrap(), 3);
        assert!(validate_page(Some("0")).is_err());
        assert!(validate_page(Some("two")).is_err());
    }

    #[test]
    fn test_validate_season() {
        assert_eq!(validate_season("0").unwrap(), 0);
        assert_eq!(validate_season("2").unwrap(), 2);
        assert!(validate_season("-1").is_err());
        assert!(validate_season("first").is_err());
    }

    #[test]
    fn test_validate_anilist_id() {
        assert!(validate_anilist_id(16498).is_ok());
        assert!(validate_anilist_id(0).is_err());
    }
}
