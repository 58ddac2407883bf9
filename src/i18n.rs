//! Labels printed by the terminal front end, in both supported languages.

use crate::preferences::Language;

#[derive(Debug)]
pub struct Strings {
    pub inventory: &'static str,
    pub fridge_question: &'static str,
    pub ingredients: &'static str,
    pub quick_add: &'static str,
    pub no_ingredients: &'static str,
    pub equipment: &'static str,
    pub diet: &'static str,
    pub time: &'static str,
    pub portions: &'static str,
    pub count: &'static str,
    pub back: &'static str,
    pub generating: &'static str,
    pub generating_sub: &'static str,
    pub hello: &'static str,
    pub here_are_suggestions: &'static str,
    pub modify: &'static str,
    pub min: &'static str,
    pub kcal: &'static str,
    pub protein: &'static str,
    pub carbs: &'static str,
    pub fats: &'static str,
    pub prep: &'static str,
    pub enjoy: &'static str,
    pub who_cooking: &'static str,
    pub enter_name: &'static str,
    pub favorites: &'static str,
    pub no_favorites: &'static str,
    pub saved_recipes: &'static str,
    pub price: &'static str,
    pub image_loading: &'static str,
    pub no_image: &'static str,
    pub generic_error: &'static str,
}

static EN: Strings = Strings {
    inventory: "Kitchen Inventory",
    fridge_question: "What's in your fridge",
    ingredients: "Ingredients",
    quick_add: "Quick Add Essentials",
    no_ingredients: "No ingredients added yet.",
    equipment: "Equipment",
    diet: "Diet",
    time: "Time Available",
    portions: "Portions",
    count: "Recipe Count",
    back: "Back to Menu",
    generating: "Crafting your menu...",
    generating_sub: "Checking prices at Carrefour & Auchan...",
    hello: "Hello",
    here_are_suggestions: "Here are your personalized suggestions.",
    modify: "Modify Inputs",
    min: "min",
    kcal: "kcal",
    protein: "Protein",
    carbs: "Carbs",
    fats: "Fats",
    prep: "Preparation",
    enjoy: "Enjoy your meal!",
    who_cooking: "Who is cooking today?",
    enter_name: "Enter your name",
    favorites: "Favorites",
    no_favorites: "No favorite recipes yet.",
    saved_recipes: "saved recipes",
    price: "Est. Price",
    image_loading: "image loading...",
    no_image: "no image",
    generic_error: "We couldn't generate recipes at this moment. Please check your connection or try again.",
};

static FR: Strings = Strings {
    inventory: "Inventaire Cuisine",
    fridge_question: "Qu'y a-t-il dans votre frigo",
    ingredients: "Ingrédients",
    quick_add: "Ajout Rapide",
    no_ingredients: "Aucun ingrédient ajouté.",
    equipment: "Équipement",
    diet: "Régime",
    time: "Temps Disponible",
    portions: "Portions",
    count: "Nombre de Plats",
    back: "Retour au Menu",
    generating: "Création de votre menu...",
    generating_sub: "Vérification des prix Carrefour & Auchan...",
    hello: "Bonjour",
    here_are_suggestions: "Voici vos suggestions personnalisées.",
    modify: "Modifier",
    min: "min",
    kcal: "kcal",
    protein: "Protéines",
    carbs: "Glucides",
    fats: "Lipides",
    prep: "Préparation",
    enjoy: "Bon appétit !",
    who_cooking: "Qui cuisine aujourd'hui ?",
    enter_name: "Entrez votre nom",
    favorites: "Favoris",
    no_favorites: "Aucun favori pour le moment.",
    saved_recipes: "recettes enregistrées",
    price: "Prix Est.",
    image_loading: "image en cours...",
    no_image: "pas d'image",
    generic_error: "Impossible de générer des recettes pour le moment. Vérifiez votre connexion ou réessayez.",
};

pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Fr => &FR,
    }
}
