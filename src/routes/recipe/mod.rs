mod handler;
mod model;

pub use handler::{
    create_recipe, delete_recipe, get_recipe, list_recipes, list_recipes_full, update_recipe,
};
