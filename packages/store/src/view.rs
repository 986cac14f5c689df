//! # Derived view: search, sort, paginate
//!
//! The authoritative student list is never reordered or filtered in place.
//! [`derive_view`] computes, in order:
//!
//! 1. the students whose name or email contains the search text
//!    (case-insensitive),
//! 2. that subsequence stably sorted by the active key with the direction
//!    applied,
//! 3. the page slice `[(page-1)*page_size, page*page_size)`.
//!
//! The page is clamped to `[1, total_pages]` and `total_pages` is never
//! less than 1.

use serde::{Deserialize, Serialize};

use crate::models::{SortDirection, SortKey, Student};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search: String,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_key: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One rendered page of the student list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub rows: Vec<Student>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
}

impl PageView {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn filter_students<'a>(students: &'a [Student], search: &str) -> Vec<&'a Student> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return students.iter().collect();
    }
    students.iter().filter(|s| s.matches(&needle)).collect()
}

pub fn sort_students(rows: &mut [&Student], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| direction.apply(key.compare(a, b)));
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn derive_view(students: &[Student], view: &ViewState) -> PageView {
    let page_size = view.page_size.max(1);
    let mut rows = filter_students(students, &view.search);
    sort_students(&mut rows, view.sort_key, view.direction);

    let filtered_count = rows.len();
    let total_pages = total_pages(filtered_count, page_size);
    let page = clamp_page(view.page, total_pages);
    let rows = rows
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    PageView {
        rows,
        page,
        total_pages,
        filtered_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(n: usize) -> Student {
        Student {
            id: format!("id-{n:02}"),
            name: format!("Student {n:02}"),
            email: format!("s{n:02}@school.edu"),
        }
    }

    fn names(view: &PageView) -> Vec<&str> {
        view.rows.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_name_both_directions() {
        let students = vec![
            Student { id: "1".into(), name: "A".into(), email: "a@x.com".into() },
            Student { id: "2".into(), name: "B".into(), email: "b@x.com".into() },
        ];
        let mut view = ViewState::default();
        assert_eq!(names(&derive_view(&students, &view)), vec!["A", "B"]);

        view.direction = SortDirection::Desc;
        assert_eq!(names(&derive_view(&students, &view)), vec!["B", "A"]);
    }

    #[test]
    fn test_third_page_of_twelve() {
        let students: Vec<Student> = (1..=12).map(student).collect();
        let view = ViewState {
            page: 3,
            ..ViewState::default()
        };
        let page = derive_view(&students, &view);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.filtered_count, 12);
        assert_eq!(names(&page), vec!["Student 11", "Student 12"]);
        assert!(page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn test_search_without_match_yields_single_empty_page() {
        let students: Vec<Student> = (1..=7).map(student).collect();
        let view = ViewState {
            search: "zzz-not-there".into(),
            page: 2,
            ..ViewState::default()
        };
        let page = derive_view(&students, &view);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name_and_email() {
        let students = vec![
            Student { id: "1".into(), name: "Grace Hopper".into(), email: "gh@navy.mil".into() },
            Student { id: "2".into(), name: "Alan".into(), email: "alan@GRACE.org".into() },
            Student { id: "3".into(), name: "Edsger".into(), email: "ed@tue.nl".into() },
        ];
        let view = ViewState {
            search: "grace".into(),
            ..ViewState::default()
        };
        assert_eq!(names(&derive_view(&students, &view)), vec!["Alan", "Grace Hopper"]);
    }

    #[test]
    fn test_derive_view_is_idempotent_and_leaves_input_alone() {
        let students: Vec<Student> = (1..=9).rev().map(student).collect();
        let original = students.clone();
        let view = ViewState {
            sort_key: SortKey::Email,
            page: 2,
            ..ViewState::default()
        };
        let first = derive_view(&students, &view);
        let second = derive_view(&students, &view);
        assert_eq!(first, second);
        assert_eq!(students, original);
    }

    #[test]
    fn test_page_is_clamped() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);

        let students: Vec<Student> = (1..=6).map(student).collect();
        let view = ViewState {
            page: 40,
            ..ViewState::default()
        };
        assert_eq!(derive_view(&students, &view).page, 2);
    }
}
