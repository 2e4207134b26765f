// Request/response types for the API
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{course, lesson, payment};
use crate::validators::validate_video_link;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i32,
}

impl From<course::Model> for CourseResponse {
    fn from(m: course::Model) -> Self {
        CourseResponse {
            id: m.id,
            title: m.title,
            description: m.description,
            owner_id: m.owner_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = validate_video_link))]
    pub link: Option<String>,
    pub course: i32,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub course_id: i32,
    pub owner_id: i32,
}

impl From<lesson::Model> for LessonResponse {
    fn from(m: lesson::Model) -> Self {
        LessonResponse {
            id: m.id,
            title: m.title,
            description: m.description,
            link: m.link,
            course_id: m.course_id,
            owner_id: m.owner_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub course: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub course: Option<i32>,
    pub lesson: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub payment_method: Option<String>,
    pub session_id: Option<String>,
    #[validate(url)]
    pub payment_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub payment_date: chrono::DateTime<chrono::Utc>,
    pub course_id: Option<i32>,
    pub lesson_id: Option<i32>,
    pub payment_method: String,
    pub session_id: Option<String>,
    pub payment_link: Option<String>,
}

impl From<payment::Model> for PaymentResponse {
    fn from(m: payment::Model) -> Self {
        PaymentResponse {
            id: m.id,
            user_id: m.user_id,
            payment_date: m.payment_date,
            course_id: m.course_id,
            lesson_id: m.lesson_id,
            payment_method: m.payment_method,
            session_id: m.session_id,
            payment_link: m.payment_link,
        }
    }
}

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// `?page=2&page_size=20` on list endpoints. Pages are numbered from 1.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based index for SeaORM's `fetch_page`.
    pub fn index(&self) -> u64 {
        self.page.unwrap_or(1).max(1) - 1
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults() {
        let q = PageQuery {
            page: None,
            page_size: None,
        };
        assert_eq!(q.size(), 10);
        assert_eq!(q.index(), 0);
    }

    #[test]
    fn page_query_clamps_size_and_page() {
        let q = PageQuery {
            page: Some(0),
            page_size: Some(100_000),
        };
        assert_eq!(q.size(), 100);
        assert_eq!(q.index(), 0);

        let q = PageQuery {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(q.size(), 25);
        assert_eq!(q.index(), 2);
    }
}
