//! Category and keyword filtering of backend lists
//!
//! Lists are fetched whole and narrowed in memory from the query string:
//! `?categorie=networking&q=dakar`.

use crate::models::{Annonce, Documentation, Evenement, Expert, Publicite, UserInfo};

/// Values of the category parameter meaning "no filter"
const ALL_CATEGORIES: &[&str] = &["", "all", "tous", "toutes"];

/// A record that can be filtered by category and searched by keyword
pub trait Searchable {
    /// Category code, `None` when the record type has no category
    fn category_code(&self) -> Option<&str>;

    /// Text fields the keyword is matched against
    fn search_fields(&self) -> Vec<&str>;
}

/// Category + keyword filter taken from the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub query: Option<String>,
}

impl ListingFilter {
    pub fn new(category: Option<&str>, query: Option<&str>) -> Self {
        let category = category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !ALL_CATEGORIES.contains(&c.as_str()));
        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        Self { category, query }
    }

    pub fn is_active(&self) -> bool {
        self.category.is_some() || self.query.is_some()
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        if let Some(category) = &self.category {
            match item.category_code() {
                Some(code) if code.eq_ignore_ascii_case(category) => {}
                _ => return false,
            }
        }
        if let Some(query) = &self.query {
            return item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(query.as_str()));
        }
        true
    }

    /// Keep matching records, in their original order
    pub fn apply<T: Searchable>(&self, items: Vec<T>) -> Vec<T> {
        if !self.is_active() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

impl Searchable for Annonce {
    fn category_code(&self) -> Option<&str> {
        Some(self.category.code())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str(), self.location.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

impl Searchable for Evenement {
    fn category_code(&self) -> Option<&str> {
        Some(self.category.code())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.venue.as_str()]
    }
}

impl Searchable for Documentation {
    fn category_code(&self) -> Option<&str> {
        Some(self.category.code())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

impl Searchable for Publicite {
    fn category_code(&self) -> Option<&str> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

impl Searchable for Expert {
    fn category_code(&self) -> Option<&str> {
        Some(self.service.code())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.user.username.as_str(),
            self.user.first_name.as_str(),
            self.user.last_name.as_str(),
            self.specialty.as_str(),
            self.location.as_str(),
        ]
    }
}

impl Searchable for UserInfo {
    fn category_code(&self) -> Option<&str> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.username.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
        ]
    }
}
