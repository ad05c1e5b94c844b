pub mod ingredients;
pub mod links;
pub mod recipes;
