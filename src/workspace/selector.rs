use serde::Serialize;

use crate::{
    error::StoreError,
    schema::{Ingredient, Uuid},
    store::RecipeStore,
};

/// Picked ingredients in pick order, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    items: Vec<Ingredient>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|ing| ing.id == id)
    }

    pub fn toggle(&mut self, ingredient: &Ingredient) -> bool {
        if self.contains(ingredient.id) {
            self.items.retain(|ing| ing.id != ingredient.id);
            false
        } else {
            self.items.push(ingredient.to_owned());
            true
        }
    }

    pub fn insert(&mut self, ingredient: Ingredient) {
        if !self.contains(ingredient.id) {
            self.items.push(ingredient);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|ing| ing.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|ing| ing.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub ingredient: &'a Ingredient,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct IngredientSelector {
    catalog: Vec<Ingredient>,
    input: String,
    open: bool,
}

impl IngredientSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_catalog<S: RecipeStore>(&mut self, store: &S) {
        match store.list_ingredients().await {
            Ok(ingredients) => {
                log::debug!("> Loaded {} ingredients", ingredients.len());
                self.catalog = ingredients;
            }
            Err(e) => {
                log::error!("Could not load ingredients from database. {e}");
                self.catalog = vec![];
            }
        }
    }

    pub fn catalog(&self) -> &[Ingredient] {
        &self.catalog
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_owned();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle(&mut self, ingredient: &Ingredient, selection: &mut SelectionSet) -> bool {
        let selected = selection.toggle(ingredient);
        self.open = false;
        selected
    }

    /// Blank input and names already in the catalog return `Ok(None)`. A failed insert keeps the input.
    pub async fn create<S: RecipeStore>(
        &mut self,
        store: &S,
        selection: &mut SelectionSet,
    ) -> Result<Option<Ingredient>, StoreError> {
        let folded = self.input.to_lowercase();
        let name = folded.trim();

        if name.is_empty() {
            return Ok(None);
        }

        // Only the local snapshot is checked; a concurrent remote insert of the same name slips through.
        if self.catalog.iter().any(|ing| ing.name == name) {
            return Ok(None);
        }

        let ingredient = store.create_ingredient(name).await?;

        self.catalog.push(ingredient.to_owned());
        selection.insert(ingredient.to_owned());
        self.input.clear();
        self.open = false;

        Ok(Some(ingredient))
    }

    // Enter only creates while the catalog is empty.
    pub async fn confirm_key<S: RecipeStore>(
        &mut self,
        store: &S,
        selection: &mut SelectionSet,
    ) -> Result<Option<Ingredient>, StoreError> {
        if !self.catalog.is_empty() {
            return Ok(None);
        }
        self.create(store, selection).await
    }

    pub fn can_offer_create(&self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        let folded = self.input.to_lowercase();
        !self
            .catalog
            .iter()
            .any(|ing| ing.name.to_lowercase() == folded)
    }

    pub fn visible_entries<'a>(&'a self, selection: &SelectionSet) -> Vec<CatalogEntry<'a>> {
        let query = self.input.trim().to_lowercase();

        self.catalog
            .iter()
            .filter(|ing| query.is_empty() || ing.name.to_lowercase().contains(&query))
            .map(|ingredient| CatalogEntry {
                ingredient,
                selected: selection.contains(ingredient.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        workspace::testing::{Failure, MemoryStore},
    };

    fn ingredient(id: u128, name: &str) -> Ingredient {
        Ingredient {
            id: Uuid::from_u128(id),
            name: name.to_string(),
        }
    }

    async fn loaded(store: &MemoryStore) -> IngredientSelector {
        let mut selector = IngredientSelector::new();
        selector.load_catalog(store).await;
        selector
    }

    #[test]
    fn selection_holds_ingredient_iff_toggled_odd_times() {
        let salt = ingredient(1, "salt");
        let mut selector = IngredientSelector::new();
        let mut selection = SelectionSet::new();

        for n in 1..=7 {
            selector.set_open(true);
            selector.toggle(&salt, &mut selection);
            assert_eq!(selection.contains(salt.id), n % 2 == 1);
            assert!(!selector.is_open());
        }
    }

    #[test]
    fn selection_keeps_insertion_order() {
        let salt = ingredient(1, "salt");
        let kale = ingredient(2, "kale");
        let mut ab = SelectionSet::new();
        let mut ba = SelectionSet::new();

        ab.toggle(&salt);
        ab.toggle(&kale);
        ba.toggle(&kale);
        ba.toggle(&salt);

        assert_eq!(ab.summary(), "salt, kale");
        assert_eq!(ba.summary(), "kale, salt");
        assert_ne!(ab, ba);
    }

    #[tokio::test]
    async fn loads_catalog_sorted_by_name() {
        let store = MemoryStore::with_catalog(&[ingredient(1, "salt"), ingredient(2, "butter")]);
        let selector = loaded(&store).await;

        let names: Vec<&str> = selector.catalog().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["butter", "salt"]);
    }

    #[tokio::test]
    async fn failed_catalog_fetch_leaves_empty_catalog() {
        let store = MemoryStore::with_catalog(&[ingredient(1, "salt")]);
        store.fail(Failure::ListIngredients);

        let selector = loaded(&store).await;
        assert!(selector.catalog().is_empty());
    }

    #[tokio::test]
    async fn create_folds_case_and_selects() {
        let store = MemoryStore::new();
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();

        selector.set_open(true);
        selector.set_input("  Basil ");
        let created = selector.create(&store, &mut selection).await.unwrap().unwrap();

        assert_eq!(created.name, "basil");
        assert_eq!(selector.catalog(), &[created.clone()]);
        assert!(selection.contains(created.id));
        assert_eq!(selector.input(), "");
        assert!(!selector.is_open());
        assert_eq!(store.ingredient_names(), vec!["basil"]);
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let store = MemoryStore::new();
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();

        for text in ["", "   "] {
            selector.set_input(text);
            assert!(selector.create(&store, &mut selection).await.unwrap().is_none());
            assert_eq!(selector.input(), text);
        }

        assert!(selector.catalog().is_empty());
        assert!(selection.is_empty());
        assert!(store.ingredient_names().is_empty());
    }

    #[tokio::test]
    async fn serialized_duplicate_create_is_a_no_op() {
        let store = MemoryStore::new();
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();

        selector.set_input("Salt");
        selector.create(&store, &mut selection).await.unwrap();
        selector.set_input("SALT");
        let second = selector.create(&store, &mut selection).await.unwrap();

        assert!(second.is_none());
        assert_eq!(selector.catalog().len(), 1);
        assert_eq!(selection.len(), 1);
        assert_eq!(store.ingredient_names(), vec!["salt"]);
    }

    #[tokio::test]
    async fn failed_insert_changes_nothing() {
        let store = MemoryStore::new();
        store.fail(Failure::CreateIngredient);
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();

        selector.set_input("Thyme");
        let err = selector.create(&store, &mut selection).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(selector.catalog().is_empty());
        assert!(selection.is_empty());
        assert_eq!(selector.input(), "Thyme");
    }

    #[tokio::test]
    async fn selection_never_duplicates_ids() {
        let store = MemoryStore::with_catalog(&[ingredient(1, "salt"), ingredient(2, "kale")]);
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();
        let catalog = selector.catalog().to_vec();

        for ing in catalog.iter().chain(catalog.iter()).chain(catalog.iter()) {
            selector.toggle(ing, &mut selection);
        }
        selector.set_input("pepper");
        selector.create(&store, &mut selection).await.unwrap();
        selector.set_input("kale");
        selector.create(&store, &mut selection).await.unwrap();

        let mut ids = selection.ids();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert_eq!(selection.summary(), "kale, salt, pepper");
    }

    #[tokio::test]
    async fn confirm_key_only_creates_on_empty_catalog() {
        let store = MemoryStore::new();
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();

        selector.set_input("salt");
        assert!(selector.confirm_key(&store, &mut selection).await.unwrap().is_some());

        selector.set_input("pepper");
        assert!(selector.confirm_key(&store, &mut selection).await.unwrap().is_none());
        assert_eq!(selector.catalog().len(), 1);
    }

    #[tokio::test]
    async fn offers_create_only_for_unknown_names() {
        let store = MemoryStore::with_catalog(&[ingredient(1, "salt")]);
        let mut selector = loaded(&store).await;

        assert!(!selector.can_offer_create());
        selector.set_input("SALT");
        assert!(!selector.can_offer_create());
        selector.set_input("Sal");
        assert!(selector.can_offer_create());
    }

    #[tokio::test]
    async fn visible_entries_filter_and_flag_selection() {
        let store = MemoryStore::with_catalog(&[
            ingredient(1, "salt"),
            ingredient(2, "basil"),
            ingredient(3, "sea salt"),
        ]);
        let mut selector = loaded(&store).await;
        let mut selection = SelectionSet::new();
        selection.toggle(&ingredient(3, "sea salt"));

        assert_eq!(selector.visible_entries(&selection).len(), 3);

        selector.set_input("SALT");
        let entries = selector.visible_entries(&selection);
        let flags: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.ingredient.name.as_str(), e.selected))
            .collect();
        assert_eq!(flags, vec![("salt", false), ("sea salt", true)]);
    }
}
