use sqlx::{Pool, Postgres};

use crate::{
    config::Config,
    error::StoreError,
    form::Form,
    realtime::{ChangeEvent, ChangeKind, ChangeSubscription},
    schema::{Ingredient, NewRecipe, Recipe, RecipeWithIngredients, User, Uuid},
    store::RecipeStore,
};

use super::{
    join::{load_recipes, resolve},
    selector::{IngredientSelector, SelectionSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    LoadFailed,
}

#[derive(Debug, Default)]
pub struct CreationDialog {
    pub selector: IngredientSelector,
    pub selection: SelectionSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub recipe: Recipe,
    pub linked: Vec<Uuid>,
    pub unlinked: Vec<Uuid>,
}

impl CreateOutcome {
    pub fn is_complete(&self) -> bool {
        self.unlinked.is_empty()
    }
}

pub struct RecipeWorkspace<S: RecipeStore> {
    store: S,
    user: User,
    state: LoadState,
    recipes: Vec<RecipeWithIngredients>,
    dialog: Option<CreationDialog>,
    subscription: Option<ChangeSubscription>,
    live_updates: bool,
}

impl RecipeWorkspace<Pool<Postgres>> {
    pub async fn mount(pool: Pool<Postgres>, user: User, config: &Config) -> Self {
        let mut workspace = Self::new(pool, user).with_live_updates(config.live_updates);

        match ChangeSubscription::open(&workspace.store).await {
            Ok(subscription) => workspace.attach(subscription),
            Err(e) => log::error!("Could not subscribe to recipe changes. {e}"),
        }

        workspace.load().await;
        workspace
    }
}

impl<S: RecipeStore> RecipeWorkspace<S> {
    pub fn new(store: S, user: User) -> Self {
        Self {
            store,
            user,
            state: LoadState::Unloaded,
            recipes: vec![],
            dialog: None,
            subscription: None,
            live_updates: false,
        }
    }

    pub fn with_live_updates(mut self, enabled: bool) -> Self {
        self.live_updates = enabled;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn recipes(&self) -> &[RecipeWithIngredients] {
        &self.recipes
    }

    pub fn recipe(&self, id: Uuid) -> Option<&RecipeWithIngredients> {
        self.recipes.iter().find(|r| r.id() == id)
    }

    // A failed load keeps the previous list.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;

        match load_recipes(&self.store, self.user.id).await {
            Ok(recipes) => {
                log::debug!("> Loaded {} recipes", recipes.len());
                self.recipes = recipes;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                log::error!("Could not load recipes. {e}");
                self.state = LoadState::LoadFailed;
            }
        }
    }

    // Creation dialog

    pub async fn open_dialog(&mut self) {
        let mut dialog = CreationDialog::default();
        dialog.selector.load_catalog(&self.store).await;
        self.dialog = Some(dialog);
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog(&self) -> Option<&CreationDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut CreationDialog> {
        self.dialog.as_mut()
    }

    pub fn toggle_ingredient(&mut self, ingredient: &Ingredient) -> bool {
        match self.dialog.as_mut() {
            Some(dialog) => dialog.selector.toggle(ingredient, &mut dialog.selection),
            None => false,
        }
    }

    pub async fn create_ingredient(&mut self, text: &str) -> Option<Ingredient> {
        let dialog = self.dialog.as_mut()?;
        dialog.selector.set_input(text);

        match dialog.selector.create(&self.store, &mut dialog.selection).await {
            Ok(created) => created,
            Err(e) => {
                log::warn!("Could not add ingredient. {e}");
                None
            }
        }
    }

    pub async fn submit(&mut self, form: &Form) -> Result<CreateOutcome, potion::Error> {
        let values = NewRecipe::from_form(form).map_err(|e| -> potion::Error { e.into() })?;
        self.create_recipe(values)
            .await
            .map_err(|e| -> potion::Error { e.into() })
    }

    /// Links are inserted after the recipe, one at a time. Failed ones end up in
    /// `CreateOutcome::unlinked` and nothing is rolled back.
    pub async fn create_recipe(&mut self, values: NewRecipe) -> Result<CreateOutcome, StoreError> {
        let selection = self
            .dialog
            .as_ref()
            .map(|dialog| dialog.selection.ids())
            .unwrap_or_default();

        let recipe = match self.store.create_recipe(self.user.id, &values).await {
            Ok(recipe) => recipe,
            Err(e) => {
                log::error!("Could not save recipe. {e}");
                return Err(e);
            }
        };

        let mut outcome = CreateOutcome {
            recipe,
            linked: vec![],
            unlinked: selection,
        };
        self.retry_links(&mut outcome).await;
        self.close_dialog();

        Ok(outcome)
    }

    pub async fn retry_links(&self, outcome: &mut CreateOutcome) {
        let pending = std::mem::take(&mut outcome.unlinked);

        for ingredient_id in pending {
            match self
                .store
                .link_ingredient(outcome.recipe.id, ingredient_id)
                .await
            {
                Ok(()) => outcome.linked.push(ingredient_id),
                Err(e) => {
                    log::warn!("Could not link ingredient {ingredient_id} to recipe {}. {e}", outcome.recipe.id);
                    outcome.unlinked.push(ingredient_id);
                }
            }
        }
    }

    // The local list stays stale until a reload or an applied change.
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> Result<(), StoreError> {
        self.store.delete_recipe(recipe_id).await.map_err(|e| {
            log::error!("Could not delete recipe {recipe_id}. {e}");
            e
        })
    }

    // Change events

    pub fn attach(&mut self, subscription: ChangeSubscription) {
        if let Some(previous) = self.subscription.replace(subscription) {
            previous.close();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    pub async fn poll_changes(&mut self) -> usize {
        let mut seen = 0;
        while let Some(event) = self.subscription.as_mut().and_then(|s| s.try_next()) {
            self.observe(event).await;
            seen += 1;
        }
        seen
    }

    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        let event = self.subscription.as_mut()?.next().await?;
        self.observe(event.clone()).await;
        Some(event)
    }

    pub async fn observe(&mut self, event: ChangeEvent) {
        log::info!(
            "Recipe change on {}.{}: {:?} {}",
            event.schema,
            event.table,
            event.kind,
            event.id
        );

        if !self.live_updates {
            return;
        }

        if let Err(e) = self.apply_change(event).await {
            log::error!("Could not apply recipe change. {e}");
        }
    }

    /// Events only carry keys, so inserts and updates re-read the row before it is joined.
    pub async fn apply_change(&mut self, event: ChangeEvent) -> Result<(), StoreError> {
        if event.kind == ChangeKind::Delete || event.user_id != self.user.id {
            self.remove_local(event.id);
            return Ok(());
        }

        let recipe = match self.store.get_recipe(event.id).await? {
            Some(recipe) if recipe.user_id == self.user.id => recipe,
            _ => {
                log::debug!("> Recipe {} is gone, dropping it", event.id);
                self.remove_local(event.id);
                return Ok(());
            }
        };

        let ids = [recipe.id];
        let mut resolved = resolve(&self.store, vec![recipe], &ids).await?;
        if let Some(entry) = resolved.pop() {
            self.upsert_local(entry);
        }

        Ok(())
    }

    fn remove_local(&mut self, id: Uuid) {
        self.recipes.retain(|r| r.id() != id);
    }

    fn upsert_local(&mut self, entry: RecipeWithIngredients) {
        if let Some(existing) = self.recipes.iter_mut().find(|r| r.id() == entry.id()) {
            *existing = entry;
            return;
        }

        let position = self
            .recipes
            .iter()
            .position(|r| r.recipe.created_at < entry.recipe.created_at)
            .unwrap_or(self.recipes.len());
        self.recipes.insert(position, entry);
    }
}
