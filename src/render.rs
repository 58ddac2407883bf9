//! Plain-text screens for the terminal front end.

use std::fmt::Write;

use crate::favorites::Favorites;
use crate::i18n::{strings, Strings};
use crate::preferences::{Language, PreferenceForm, COMMON_INGREDIENTS, DIET_OPTIONS, TOOL_OPTIONS};
use crate::recipe::Recipe;
use crate::view_state::{ImageState, ViewState};

fn image_line(state: ImageState<'_>, t: &Strings) -> String {
    match state {
        ImageState::Loading => format!("[{}]", t.image_loading),
        ImageState::Unavailable => format!("[{}]", t.no_image),
        ImageState::Ready(uri) if uri.starts_with("data:") => "[image: inline]".to_string(),
        ImageState::Ready(uri) => format!("[image: {}]", uri),
    }
}

/// One list entry: title, star, description, time, kcal badge and price.
pub fn recipe_card(
    index: usize,
    recipe: &Recipe,
    image: ImageState<'_>,
    is_favorite: bool,
    language: Language,
) -> String {
    let t = strings(language);
    let star = if is_favorite { "★" } else { "☆" };
    format!(
        "{index}. {star} {title}\n   {description}\n   {time} {min} | {calories} {kcal} | {price}\n   {image}\n",
        index = index,
        star = star,
        title = recipe.title,
        description = recipe.description,
        time = recipe.time_to_cook,
        min = t.min,
        calories = recipe.calories,
        kcal = t.kcal,
        price = recipe.price_estimate,
        image = image_line(image, t),
    )
}

fn recipe_list(
    out: &mut String,
    recipes: &[Recipe],
    view: &ViewState,
    favorites: &Favorites,
    language: Language,
) {
    for (i, recipe) in recipes.iter().enumerate() {
        out.push_str(&recipe_card(
            i + 1,
            recipe,
            view.image_state(&recipe.id),
            favorites.contains(&recipe.id),
            language,
        ));
    }
}

pub fn results_screen(view: &ViewState, favorites: &Favorites, language: Language) -> String {
    let t = strings(language);
    let mut out = String::new();
    let _ = writeln!(out, "{}, {}", t.hello, view.user_name());
    let _ = writeln!(out, "{}\n", t.here_are_suggestions);
    recipe_list(&mut out, view.recipes(), view, favorites, language);
    let _ = writeln!(out, "\n[{}]", t.modify);
    out
}

pub fn favorites_screen(view: &ViewState, favorites: &Favorites, language: Language) -> String {
    let t = strings(language);
    let mut out = String::new();
    let _ = writeln!(out, "{}", t.favorites);
    let _ = writeln!(out, "{} {}\n", favorites.len(), t.saved_recipes);
    if favorites.is_empty() {
        let _ = writeln!(out, "{}", t.no_favorites);
    } else {
        recipe_list(&mut out, favorites.recipes(), view, favorites, language);
    }
    let _ = writeln!(out, "\n[{}]", t.back);
    out
}

pub fn detail_screen(
    recipe: &Recipe,
    image: ImageState<'_>,
    is_favorite: bool,
    language: Language,
) -> String {
    let t = strings(language);
    let mut out = String::new();
    let star = if is_favorite { "★" } else { "☆" };
    let _ = writeln!(out, "{} {}", star, recipe.title);
    let _ = writeln!(out, "{}", image_line(image, t));
    let _ = writeln!(out, "{}\n", recipe.description);
    let _ = writeln!(
        out,
        "{}m | {}: {}g | {}: {}g | {}: {}g | {} {} | {}: {}",
        recipe.time_to_cook,
        t.protein,
        recipe.protein,
        t.carbs,
        recipe.carbs,
        t.fats,
        recipe.fats,
        recipe.calories,
        t.kcal,
        t.price,
        recipe.price_estimate
    );

    let _ = writeln!(out, "\n{}:", t.ingredients);
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  - {}", ingredient);
    }
    if !recipe.tools_needed.is_empty() {
        let _ = writeln!(out, "\n{}:", t.equipment);
        for tool in &recipe.tools_needed {
            let _ = writeln!(out, "  - {}", tool);
        }
    }
    let _ = writeln!(out, "\n{}:", t.prep);
    for (i, step) in recipe.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    let _ = writeln!(out, "\n{}", t.enjoy);
    out
}

/// Current form values, with the catalogs each choice is taken from.
pub fn preference_form(form: &PreferenceForm, language: Language) -> String {
    let t = strings(language);
    let mut out = String::new();
    let _ = writeln!(out, "{}", t.inventory);
    if form.ingredients().is_empty() {
        let _ = writeln!(out, "{}: {}", t.ingredients, t.no_ingredients);
    } else {
        let _ = writeln!(out, "{}: {}", t.ingredients, form.ingredients().join(", "));
    }
    let _ = writeln!(out, "{}: {}", t.quick_add, COMMON_INGREDIENTS.join(", "));

    let tools = if form.tools().is_empty() {
        "-".to_string()
    } else {
        form.tools().join(", ")
    };
    let _ = writeln!(out, "{}: {}   [{}]", t.equipment, tools, TOOL_OPTIONS.join(", "));
    let _ = writeln!(out, "{}: {}   [{}]", t.diet, form.diet(), DIET_OPTIONS.join(", "));
    let _ = writeln!(out, "{}: {} {}", t.time, form.time_available(), t.min);
    let _ = writeln!(out, "{}: {}", t.portions, form.portions());
    let _ = writeln!(out, "{}: {}", t.count, form.number_of_dishes());
    out
}
