//! Review forms.

use serde::Deserialize;

use super::ValidationErrors;

/// Review submission from the vehicle detail page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewForm {
    pub review_text: String,
    pub review_rating: String,
    pub inv_id: String,
}

/// Text and rating of a review that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub review_text: String,
    pub review_rating: i32,
}

impl ReviewForm {
    /// Whether the submitted rating is `value`, for re-selecting it.
    #[must_use]
    pub fn rating_is(&self, value: i32) -> bool {
        self.review_rating.trim().parse::<i32>() == Ok(value)
    }

    /// The submitted rating when it is not one of the listed choices, so a
    /// re-render can still show it.
    #[must_use]
    pub fn unlisted_rating(&self) -> Option<&str> {
        let listed = (1..=5).any(|value| self.rating_is(value));
        Some(self.review_rating.as_str()).filter(|raw| !raw.trim().is_empty() && !listed)
    }

    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self) -> Result<ValidReview, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = self.review_text.trim();
        errors.check(
            "review_text",
            text.chars().count() >= 5,
            "Review text must be at least 5 characters long.",
        );
        let rating = self
            .review_rating
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|r| (1..=5).contains(r));
        errors.check(
            "review_rating",
            rating.is_some(),
            "A rating between 1 and 5 is required.",
        );

        match rating {
            Some(review_rating) if errors.is_empty() => Ok(ValidReview {
                review_text: text.to_string(),
                review_rating,
            }),
            _ => Err(errors),
        }
    }
}

/// Review delete confirmation submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewDeleteForm {
    pub review_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_review_is_trimmed() {
        let form = ReviewForm {
            review_text: "  Smooth ride, great mileage. ".to_string(),
            review_rating: "4".to_string(),
            inv_id: "1".to_string(),
        };
        let review = form.validate().unwrap();
        assert_eq!(review.review_text, "Smooth ride, great mileage.");
        assert_eq!(review.review_rating, 4);
    }

    #[test]
    fn test_short_text_and_bad_rating() {
        let form = ReviewForm {
            review_text: "ok".to_string(),
            review_rating: "6".to_string(),
            inv_id: "1".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().messages(),
            vec![
                "Review text must be at least 5 characters long.",
                "A rating between 1 and 5 is required.",
            ]
        );
    }

    #[test]
    fn test_rating_is_reselects_submitted_value() {
        let form = ReviewForm {
            review_rating: " 3".to_string(),
            ..ReviewForm::default()
        };
        assert!(form.rating_is(3));
        assert!(!form.rating_is(4));
        assert!(!ReviewForm::default().rating_is(0));
    }

    #[test]
    fn test_unlisted_rating_is_kept_for_rerender() {
        let form = |rating: &str| ReviewForm {
            review_rating: rating.to_string(),
            ..ReviewForm::default()
        };
        assert_eq!(form("7").unlisted_rating(), Some("7"));
        assert_eq!(form("great").unlisted_rating(), Some("great"));
        assert_eq!(form("5").unlisted_rating(), None);
        assert_eq!(form(" ").unlisted_rating(), None);
    }
}
