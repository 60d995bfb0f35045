//! Data models
//!
//! This module contains all data structures used throughout the newsdesk API.
//! Models represent:
//! - Database entities (User, Category, News, Revision, Session)
//! - Input types for create/update operations
//! - Pagination parameters and results

mod category;
mod news;
mod pagination;
mod revision;
mod session;
mod status;
mod user;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use news::{CreateNewsInput, News, NewsSnapshot, UpdateNewsInput};
pub use pagination::{ListParams, PagedResult};
pub use revision::{Revision, RevisionEvent, SUBJECT_NEWS};
pub use session::Session;
pub use status::EntityStatus;
pub use user::{Actor, UpdateUserInput, User, UserRole};
