use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use uuid::Uuid;

/// Catalog entry. Names are stored case-folded.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub photo: Option<String>,
    pub custom_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Linkage row of the `recipe_ingredients` table.
#[derive(sqlx::FromRow, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<String>,
}

impl RecipeWithIngredients {
    pub fn id(&self) -> Uuid {
        self.recipe.id
    }
}

/// Values of the recipe creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub photo: Option<String>,
    pub custom_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}
