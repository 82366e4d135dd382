use crate::entry::{parse_entry_date, Attendance, EntryDraft};
use crate::error::{CoreError, ValidationError};

/// Maximum length of an entry's notes, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum length of a student's full name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Validator for entry drafts, coordinates and roster names.
pub struct Validator;

impl Validator {
    /// Validate latitude value.
    pub fn validate_latitude(lat: f64) -> Result<(), CoreError> {
        if lat.is_nan() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::invalid_latitude(lat));
        }
        Ok(())
    }

    /// Validate longitude value.
    pub fn validate_longitude(lon: f64) -> Result<(), CoreError> {
        if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoreError::invalid_longitude(lon));
        }
        Ok(())
    }

    pub fn validate_pages(pages: f64) -> Result<(), ValidationError> {
        if !pages.is_finite() || pages < 0.0 {
            return Err(ValidationError::InvalidPages(pages));
        }
        Ok(())
    }

    /// Validate minutes as received from the wire, where negatives can appear.
    pub fn validate_time_minutes(minutes: i64) -> Result<u32, ValidationError> {
        u32::try_from(minutes).map_err(|_| ValidationError::InvalidTimeMinutes(minutes))
    }

    /// Validate optional notes.
    /// If present, must be max 1000 chars.
    pub fn validate_notes(notes: &Option<String>) -> Result<(), ValidationError> {
        if let Some(n) = notes {
            let len = n.chars().count();
            if len > MAX_NOTES_LEN {
                return Err(ValidationError::NotesTooLong(len));
            }
        }
        Ok(())
    }

    pub fn validate_attendance(raw: &str) -> Result<Attendance, ValidationError> {
        raw.parse()
    }

    /// Validate a student's display name: non-blank, max 200 chars.
    pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidName(
                "full_name cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::InvalidName(format!(
                "full_name too long: {} chars (max {})",
                trimmed.chars().count(),
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    /// Validate a complete draft before it reaches a store.
    pub fn validate_draft(draft: &EntryDraft) -> Result<(), CoreError> {
        parse_entry_date(&draft.date)?;
        Self::validate_pages(draft.pages)?;
        Self::validate_notes(&draft.notes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_latitude() {
        assert!(Validator::validate_latitude(0.0).is_ok());
        assert!(Validator::validate_latitude(90.0).is_ok());
        assert!(Validator::validate_latitude(-90.0).is_ok());
        assert!(Validator::validate_latitude(21.4225).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        assert!(Validator::validate_latitude(90.1).is_err());
        assert!(Validator::validate_latitude(-90.1).is_err());
        assert!(Validator::validate_latitude(f64::NAN).is_err());
        assert!(Validator::validate_latitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_valid_longitude() {
        assert!(Validator::validate_longitude(0.0).is_ok());
        assert!(Validator::validate_longitude(180.0).is_ok());
        assert!(Validator::validate_longitude(-180.0).is_ok());
        assert!(Validator::validate_longitude(39.8262).is_ok());
    }

    #[test]
    fn test_invalid_longitude() {
        assert!(Validator::validate_longitude(180.1).is_err());
        assert!(Validator::validate_longitude(-180.1).is_err());
        assert!(Validator::validate_longitude(f64::NAN).is_err());
    }

    #[test]
    fn test_pages() {
        assert!(Validator::validate_pages(0.0).is_ok());
        assert!(Validator::validate_pages(2.5).is_ok());
        assert!(Validator::validate_pages(-0.5).is_err());
        assert!(Validator::validate_pages(f64::NAN).is_err());
        assert!(Validator::validate_pages(f64::INFINITY).is_err());
    }

    #[test]
    fn test_time_minutes() {
        assert_eq!(Validator::validate_time_minutes(45), Ok(45));
        assert_eq!(Validator::validate_time_minutes(0), Ok(0));
        assert_eq!(
            Validator::validate_time_minutes(-1),
            Err(ValidationError::InvalidTimeMinutes(-1))
        );
    }

    #[test]
    fn test_notes() {
        assert!(Validator::validate_notes(&None).is_ok());
        assert!(Validator::validate_notes(&Some("ح".repeat(MAX_NOTES_LEN))).is_ok());
        assert_eq!(
            Validator::validate_notes(&Some("a".repeat(MAX_NOTES_LEN + 1))),
            Err(ValidationError::NotesTooLong(MAX_NOTES_LEN + 1))
        );
    }

    #[test]
    fn test_full_name() {
        assert!(Validator::validate_full_name("Aisha Rahman").is_ok());
        assert!(Validator::validate_full_name("   ").is_err());
        assert!(Validator::validate_full_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_draft() {
        let valid = EntryDraft::new("2024-05-01", 1.0, 20);
        assert!(Validator::validate_draft(&valid).is_ok());

        let bad_date = EntryDraft::new("01/05/2024", 1.0, 20);
        assert!(matches!(
            Validator::validate_draft(&bad_date),
            Err(CoreError::InvalidDate(_))
        ));

        let bad_pages = EntryDraft::new("2024-05-01", -1.0, 20);
        assert!(matches!(
            Validator::validate_draft(&bad_pages),
            Err(CoreError::Validation(ValidationError::InvalidPages(_)))
        ));
    }
}
