//! Form payloads. Missing fields deserialize as empty strings.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

use parks_common::NewStory;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub email: String,
}

/// Trimmed story fields, checked before anything is stored.
#[derive(Debug, Validate)]
struct StoryInput {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters."))]
    title: String,
    #[validate(length(min = 1, max = 5000, message = "Story must be 1 to 5000 characters."))]
    text: String,
    #[validate(email(message = "Enter a valid email address."))]
    email: Option<String>,
}

/// Field name to error messages, for re-rendering the form.
pub type FormErrors = BTreeMap<String, Vec<String>>;

impl StoryForm {
    /// Validate the submission and bind it to a park.
    pub fn validate_for(&self, park_id: i64) -> Result<NewStory, FormErrors> {
        let email = self.email.trim();
        let input = StoryInput {
            title: self.title.trim().to_string(),
            text: self.text.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
        };

        if let Err(e) = input.validate() {
            let errors = e
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let messages = errs
                        .iter()
                        .map(|err| {
                            err.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("Invalid {field}."))
                        })
                        .collect();
                    (field.to_string(), messages)
                })
                .collect();
            return Err(errors);
        }

        Ok(NewStory {
            park_id,
            title: input.title,
            text: input.text,
            email: input.email,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    pub parkname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExploreForm {
    pub parkname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExploreQuery {
    pub neighborhood: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, text: &str, email: &str) -> StoryForm {
        StoryForm {
            title: title.into(),
            text: text.into(),
            email: email.into(),
        }
    }

    #[test]
    fn valid_story_is_trimmed_and_bound() {
        let story = form("  Sledding  ", " Great hill. ", " kid@example.com ")
            .validate_for(7)
            .unwrap();
        assert_eq!(story.park_id, 7);
        assert_eq!(story.title, "Sledding");
        assert_eq!(story.text, "Great hill.");
        assert_eq!(story.email.as_deref(), Some("kid@example.com"));
    }

    #[test]
    fn blank_email_is_omitted() {
        let story = form("Title", "Text", "   ").validate_for(1).unwrap();
        assert!(story.email.is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let errors = form("   ", "Text", "").validate_for(1).unwrap_err();
        assert!(errors.contains_key("title"));
        assert!(!errors.contains_key("text"));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let errors = form(&"t".repeat(101), &"x".repeat(5001), "")
            .validate_for(1)
            .unwrap_err();
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("text"));
    }

    #[test]
    fn title_length_counts_characters() {
        let title = "é".repeat(100);
        assert!(form(&title, "Text", "").validate_for(1).is_ok());
    }

    #[test]
    fn bad_email_is_rejected() {
        let errors = form("Title", "Text", "not-an-address").validate_for(1).unwrap_err();
        assert_eq!(errors["email"], vec!["Enter a valid email address.".to_string()]);
    }
}
