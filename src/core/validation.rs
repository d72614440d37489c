//! Boundary validation for page forms.
//!
//! Forms derive `validator::Validate`; this module turns the first failing
//! field (in form order) into an `HmsError` so nothing reaches the store.

use validator::{Validate, ValidationError, ValidationErrorsKind};

use crate::error::HmsError;
use crate::models::OpenEnum;

/// Error codes that mean "nothing was entered" rather than "entered wrong".
const MISSING_CODES: &[&str] = &["required", "not_blank", "length"];

/// A form that can be submitted. `FIELDS` lists the validated fields in the
/// order they appear on the form.
pub trait Submission: Validate {
    const FIELDS: &'static [&'static str];
}

/// Runs the form's validators and reports the first failing field.
pub fn validate_submission<S: Submission>(form: &S) -> Result<(), HmsError> {
    let errors = match form.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };
    let by_field = errors.errors();

    let failing = S::FIELDS
        .iter()
        .copied()
        .find(|field| by_field.contains_key(field))
        .or_else(|| by_field.keys().min().copied());

    let Some(field) = failing else {
        return Ok(());
    };

    let first = match by_field.get(field) {
        Some(ValidationErrorsKind::Field(errs)) => errs.first(),
        _ => None,
    };

    match first {
        Some(err) if !MISSING_CODES.contains(&&*err.code) => Err(HmsError::InvalidField {
            field,
            reason: err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string()),
        }),
        _ => Err(HmsError::MissingField(field)),
    }
}

/// Rejects strings that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Rejects values outside the field's known set. Stored records may carry
/// such values; new submissions may not.
pub fn known_value<T: OpenEnum>(value: &T) -> Result<(), ValidationError> {
    if value.is_known() {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_value");
    err.message = Some(format!("must be one of {}", T::KNOWN.join(", ")).into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplaintStatus;

    #[derive(Validate)]
    struct Form {
        #[validate(custom = "not_blank")]
        name: String,
        #[validate(required)]
        score: Option<i64>,
        #[validate(email)]
        email: Option<String>,
        #[validate(length(min = 1))]
        tags: Vec<String>,
    }

    impl Submission for Form {
        const FIELDS: &'static [&'static str] = &["name", "score", "email", "tags"];
    }

    fn valid() -> Form {
        Form {
            name: "Ada".into(),
            score: Some(3),
            email: None,
            tags: vec!["x".into()],
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate_submission(&valid()).is_ok());
    }

    #[test]
    fn first_missing_field_in_form_order_is_reported() {
        let form = Form {
            name: "  ".into(),
            score: None,
            tags: vec![],
            ..valid()
        };
        assert!(matches!(validate_submission(&form), Err(HmsError::MissingField("name"))));

        let form = Form { score: None, tags: vec![], ..valid() };
        assert!(matches!(validate_submission(&form), Err(HmsError::MissingField("score"))));
    }

    #[test]
    fn malformed_value_is_invalid_not_missing() {
        let form = Form {
            email: Some("not-an-address".into()),
            ..valid()
        };
        match validate_submission(&form) {
            Err(HmsError::InvalidField { field, reason }) => {
                assert_eq!(field, "email");
                assert_eq!(reason, "email");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn known_value_lists_the_accepted_values() {
        assert!(known_value(&ComplaintStatus::Closed).is_ok());

        let err = known_value(&ComplaintStatus::Unrecognized("escalated".into())).unwrap_err();
        assert_eq!(err.code, "unknown_value");
        assert_eq!(
            err.message.as_deref(),
            Some("must be one of submitted, in_progress, resolved, closed")
        );
    }
}
