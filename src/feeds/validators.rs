use super::models::CreateFeedRequest;
use crate::common::validation::require_non_blank;
use crate::common::{ValidationResult, Validator};

pub struct FeedValidator;

impl Validator<CreateFeedRequest> for FeedValidator {
    fn validate(&self, data: &CreateFeedRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_non_blank(&mut result, "title", &data.title);
        if data.title.len() > 255 {
            result.add_error("title", "title must not exceed 255 characters");
        }

        let url = data.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            result.add_error("url", "url must start with http:// or https://");
        }

        result
    }
}
