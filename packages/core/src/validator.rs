use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{BuildingInput, DefectCreate, Id, UserInput};

/// Validation error for a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

lazy_static! {
    static ref EMAIL_PATTERN: Option<Regex> = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(email))
        .unwrap_or(false)
}

/// Validates the new-defect form
pub fn validate_defect(data: &DefectCreate) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.title.trim().is_empty() {
        errors.push(ValidationError::new("title", "Title is required"));
    }

    if data.description.trim().is_empty() {
        errors.push(ValidationError::new("description", "Description is required"));
    }

    if data.building_id.is_none() {
        errors.push(ValidationError::new("building_id", "Building is required"));
    }

    if data.priority.is_none() {
        errors.push(ValidationError::new("priority", "Priority is required"));
    }

    errors
}

/// Validates the building form
pub fn validate_building(data: &BuildingInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Building name is required"));
    }

    if data.address.trim().is_empty() {
        errors.push(ValidationError::new("address", "Address is required"));
    }

    errors
}

/// Validates the user form. A password is only mandatory when creating.
pub fn validate_user(data: &UserInput, is_new: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_email(&data.email) {
        errors.push(ValidationError::new("email", "Please enter a valid email address"));
    }

    let has_password = data
        .password
        .as_deref()
        .map(|p| !p.trim().is_empty())
        .unwrap_or(false);
    if is_new && !has_password {
        errors.push(ValidationError::new("password", "Password is required for new users"));
    }

    errors
}

/// Drop a blank password so that editing a user keeps the old one
pub fn normalize_user_input(mut data: UserInput) -> UserInput {
    if data.password.as_deref().map(str::trim).unwrap_or("").is_empty() {
        data.password = None;
    }
    data
}

/// Trim a report comment, rejecting empty text
pub fn validate_comment(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("comment", "Comment cannot be empty."));
    }
    Ok(trimmed.to_string())
}

/// Users may not delete their own account
pub fn validate_user_deletion(current_user: Id, target: Id) -> Result<(), ValidationError> {
    if current_user == target {
        return Err(ValidationError::new("id", "You cannot delete your own account"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Role};
    use rstest::rstest;

    fn messages(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_empty_defect_form() {
        let errors = validate_defect(&DefectCreate::default());
        assert_eq!(
            messages(&errors),
            vec![
                "Title is required",
                "Description is required",
                "Building is required",
                "Priority is required",
            ]
        );
    }

    #[test]
    fn test_valid_defect_form() {
        let data = DefectCreate {
            title: "Leak".into(),
            description: "Water under sink".into(),
            building_id: Some(1),
            priority: Some(Priority::Medium),
            ..Default::default()
        };
        assert!(validate_defect(&data).is_empty());
    }

    #[test]
    fn test_whitespace_title_is_rejected() {
        let data = DefectCreate {
            title: "   ".into(),
            description: "x".into(),
            building_id: Some(1),
            priority: Some(Priority::Low),
            ..Default::default()
        };
        assert_eq!(messages(&validate_defect(&data)), vec!["Title is required"]);
    }

    #[test]
    fn test_building_form() {
        let errors = validate_building(&BuildingInput {
            name: " ".into(),
            address: String::new(),
        });
        assert_eq!(
            messages(&errors),
            vec!["Building name is required", "Address is required"]
        );
    }

    #[rstest]
    #[case("ana@example.com", true)]
    #[case("ana.b@sub.example.org", true)]
    #[case("ana@example", false)]
    #[case("ana example@x.com", false)]
    #[case("@example.com", false)]
    fn test_email_pattern(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid);
    }

    #[test]
    fn test_new_user_requires_password() {
        let input = UserInput {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role: Role::Csr,
            password: Some("  ".into()),
        };
        assert_eq!(
            messages(&validate_user(&input, true)),
            vec!["Password is required for new users"]
        );
        assert!(validate_user(&input, false).is_empty());
        assert!(normalize_user_input(input).password.is_none());
    }

    #[test]
    fn test_comment_is_trimmed() {
        assert_eq!(validate_comment("  looks fine \n").unwrap(), "looks fine");
        assert_eq!(
            validate_comment("   ").unwrap_err().message,
            "Comment cannot be empty."
        );
    }

    #[test]
    fn test_self_deletion_is_blocked() {
        assert!(validate_user_deletion(3, 4).is_ok());
        assert_eq!(
            validate_user_deletion(3, 3).unwrap_err().message,
            "You cannot delete your own account"
        );
    }
}
