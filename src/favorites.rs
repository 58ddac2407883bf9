use std::collections::HashSet;

use crate::recipe::Recipe;

/// Saved recipes keyed by id, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    recipes: Vec<Recipe>,
}

impl Favorites {
    /// Keeps the first occurrence of each id.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        let mut seen = HashSet::new();
        let recipes = recipes
            .into_iter()
            .filter(|recipe| seen.insert(recipe.id.clone()))
            .collect();
        Self { recipes }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.recipes.iter().any(|r| r.id == recipe_id)
    }

    /// Adds the recipe, or removes the saved one with the same id.
    /// Returns whether the recipe is a favorite afterwards.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        if let Some(pos) = self.recipes.iter().position(|r| r.id == recipe.id) {
            self.recipes.remove(pos);
            false
        } else {
            self.recipes.push(recipe.clone());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::tests::recipe_json;

    fn recipe(id: &str) -> Recipe {
        serde_json::from_value(recipe_json(id, id)).unwrap()
    }

    #[test]
    fn double_toggle_restores_original_set() {
        let mut favorites = Favorites::from_recipes(vec![recipe("a"), recipe("b")]);
        let original = favorites.clone();

        assert!(favorites.toggle(&recipe("c")));
        assert!(!favorites.toggle(&recipe("c")));
        assert_eq!(favorites, original);

        assert!(!favorites.toggle(&recipe("a")));
        assert!(favorites.toggle(&recipe("a")));
        assert_eq!(favorites.len(), 2);
        assert!(favorites.contains("a"));
    }

    #[test]
    fn toggle_matches_by_id_only() {
        let mut favorites = Favorites::default();
        favorites.toggle(&recipe("a"));
        let mut renamed = recipe("a");
        renamed.title = "Different title".to_string();
        assert!(!favorites.toggle(&renamed));
        assert!(favorites.is_empty());
    }

    #[test]
    fn duplicates_are_dropped_on_load() {
        let favorites = Favorites::from_recipes(vec![recipe("a"), recipe("a"), recipe("b")]);
        let ids: Vec<&str> = favorites.recipes().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(favorites.contains("b"));
    }
}
