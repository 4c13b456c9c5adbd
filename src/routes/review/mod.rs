mod handler;
mod model;

pub use handler::{create_review, delete_review, get_review, list_reviews, update_review};
