// Capture settings and their JSON persistence.

pub mod store;
pub mod types;
