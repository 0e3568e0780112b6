//! Request paths for the LMS API, relative to the configured base address

use url::form_urlencoded;

/// Courses of an account matching a search term
pub fn account_courses(account_id: u64, search_term: &str, page_size: u32) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("search_term", search_term)
        .append_pair("per_page", &page_size.to_string())
        .finish();
    format!("accounts/{}/courses?{}", account_id, query)
}

/// Users enrolled in a course as teachers, with their email addresses
pub fn course_teachers(course_id: u64, page_size: u32) -> String {
    format!(
        "courses/{}/users?enrollment_type[]=teacher&include[]=email&per_page={}",
        course_id, page_size
    )
}

pub fn course_modules(course_id: u64, page_size: u32) -> String {
    format!("courses/{}/modules?per_page={}", course_id, page_size)
}

pub fn course_assignments(course_id: u64, page_size: u32) -> String {
    format!("courses/{}/assignments?per_page={}", course_id, page_size)
}

pub fn course_front_page(course_id: u64) -> String {
    format!("courses/{}/front_page", course_id)
}
