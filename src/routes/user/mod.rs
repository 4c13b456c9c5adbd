mod handler;
mod model;

pub use handler::{delete_me, login, me, register};
