//! Cooking vocabularies shared by the extractors.
//!
//! These tables drive the rule-based paths: ingredient scanning, dietary
//! inference, cooking-action mining, and the food allowlist for object
//! detection. All matching is done on lowercased text.

/// Curated ingredient vocabulary, grouped for readability. Matching scans
/// every group in order.
pub const INGREDIENT_GROUPS: &[(&str, &[&str])] = &[
    (
        "proteins",
        &[
            "chicken", "beef", "pork", "fish", "salmon", "tuna", "shrimp", "tofu", "eggs",
            "cheese",
        ],
    ),
    (
        "vegetables",
        &[
            "onion",
            "garlic",
            "tomato",
            "carrot",
            "celery",
            "bell pepper",
            "spinach",
            "broccoli",
            "zucchini",
            "mushroom",
        ],
    ),
    (
        "grains",
        &["rice", "pasta", "quinoa", "flour", "bread", "oats", "barley"],
    ),
    (
        "herbs_spices",
        &[
            "basil", "oregano", "thyme", "parsley", "cilantro", "rosemary", "salt", "pepper",
            "paprika", "cumin",
        ],
    ),
    ("fats", &["olive oil", "butter", "coconut oil", "avocado"]),
    (
        "dairy",
        &["milk", "cream", "yogurt", "mozzarella", "parmesan", "ricotta"],
    ),
    (
        "pantry",
        &["sugar", "honey", "soy sauce", "vinegar", "lemon", "lime"],
    ),
];

/// Maximum ingredients returned by any single extraction or merge.
pub const MAX_INGREDIENTS: usize = 12;

/// Scan text for known ingredients. Returns lowercased, de-duplicated
/// matches in vocabulary order, capped at [`MAX_INGREDIENTS`].
pub fn find_ingredients(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut found = Vec::new();

    for (_, ingredients) in INGREDIENT_GROUPS {
        for ingredient in *ingredients {
            if text_lower.contains(ingredient) && !found.iter().any(|f| f == ingredient) {
                found.push((*ingredient).to_string());
                if found.len() >= MAX_INGREDIENTS {
                    return found;
                }
            }
        }
    }

    found
}

/// Words that indicate the text is actually about cooking.
pub const COOKING_WORDS: &[&str] = &[
    "recipe", "cook", "bake", "fry", "grill", "roast", "simmer", "boil",
];

/// Cooking action verbs matched against spoken transcripts.
pub const ACTION_VERBS: &[&str] = &[
    "add",
    "mix",
    "stir",
    "cook",
    "heat",
    "bake",
    "fry",
    "boil",
    "simmer",
    "chop",
    "dice",
    "slice",
    "mince",
    "season",
    "pour",
    "blend",
    "whisk",
    "combine",
    "fold",
    "grill",
    "roast",
    "sauté",
    "steam",
    "marinate",
    "garnish",
    "serve",
    "plate",
    "drizzle",
    "sprinkle",
    "toss",
    "caramelize",
    "braise",
    "sear",
    "poach",
    "blanch",
    "reduce",
    "deglaze",
    "julienne",
];

/// Ingredients commonly named in spoken instructions.
pub const SPOKEN_INGREDIENTS: &[&str] = &[
    "salt",
    "pepper",
    "oil",
    "butter",
    "garlic",
    "onion",
    "tomato",
    "cheese",
    "chicken",
    "beef",
    "pork",
    "fish",
    "pasta",
    "rice",
    "flour",
    "sugar",
    "eggs",
    "milk",
    "cream",
    "herbs",
    "spices",
    "vegetables",
    "fruits",
    "lemon",
    "lime",
    "vinegar",
    "wine",
    "stock",
    "broth",
    "sauce",
];

/// Kitchen equipment names, used for cooking-term density.
pub const EQUIPMENT: &[&str] = &[
    "pan",
    "pot",
    "oven",
    "stove",
    "microwave",
    "blender",
    "mixer",
    "knife",
    "cutting board",
    "bowl",
    "spatula",
    "whisk",
    "ladle",
    "skillet",
    "saucepan",
    "baking sheet",
    "casserole",
    "grill",
];

/// Spoken time units.
pub const TIME_UNITS: &[&str] = &[
    "minute", "minutes", "second", "seconds", "hour", "hours", "mins", "secs", "hrs",
];

/// Allowlist used to keep only food-related object detections.
pub const FOOD_DETECTION_ALLOWLIST: &[&str] = &[
    "apple", "banana", "orange", "carrot", "broccoli", "tomato", "potato", "onion", "garlic",
    "pepper", "mushroom", "cheese", "bread", "egg", "chicken", "beef", "fish", "pasta", "rice",
    "flour", "milk", "butter", "oil", "salt", "sugar", "lemon", "avocado", "spinach", "lettuce",
    "pizza", "sandwich", "salad",
];

/// Techniques that raise difficulty.
pub const ADVANCED_TECHNIQUES: &[&str] = &[
    "tempering",
    "emulsify",
    "clarify",
    "reduction",
    "confit",
    "sous vide",
    "ferment",
    "cure",
    "smoke",
    "braise",
];

/// Equipment that raises difficulty.
pub const COMPLEX_EQUIPMENT: &[&str] = &["stand mixer", "food processor", "mandoline"];

/// Per-ingredient cooking-time adjustments, in minutes.
pub const INGREDIENT_TIME_ADJUSTMENTS: &[(&str, i64)] = &[
    ("beans", 60),
    ("beef", 35),
    ("pork", 30),
    ("chicken", 25),
    ("potato", 20),
    ("rice", 15),
    ("pasta", 15),
    ("quinoa", 15),
    ("barley", 25),
    ("bread", 25),
    ("fish", 10),
    ("eggs", 5),
];

/// Textual cues that shift a cooking-time estimate, in minutes.
pub const TIME_CUE_ADJUSTMENTS: &[(&str, i64)] = &[
    ("quick", -10),
    ("fast", -10),
    ("instant", -15),
    ("slow", 30),
    ("simmer", 20),
    ("braise", 45),
    ("roast", 60),
    ("oven", 15),
    ("marinade", 15),
    ("chill", 10),
    ("rest", 5),
];

// Dietary keyword sets. Negative inference uses the presence sets; explicit
// phrases assert a tag directly.

pub const MEAT_KEYWORDS: &[&str] = &[
    "chicken", "beef", "pork", "fish", "salmon", "tuna", "shrimp", "bacon", "ham", "turkey",
    "lamb", "sausage", "meat",
];

pub const DAIRY_KEYWORDS: &[&str] = &[
    "milk",
    "cheese",
    "butter",
    "cream",
    "yogurt",
    "mozzarella",
    "parmesan",
    "ricotta",
    "ghee",
];

pub const EGG_KEYWORDS: &[&str] = &["egg", "eggs", "mayonnaise"];

pub const GLUTEN_KEYWORDS: &[&str] = &[
    "flour", "bread", "pasta", "wheat", "barley", "rye", "couscous", "noodles", "crouton",
];

pub const NUT_KEYWORDS: &[&str] = &[
    "almond", "walnut", "pecan", "cashew", "peanut", "pistachio", "hazelnut", "nuts",
];

pub const VEGAN_PHRASES: &[&str] = &["vegan", "plant-based", "no dairy", "no meat", "no animal"];

pub const VEGETARIAN_PHRASES: &[&str] = &["vegetarian", "veggie", "no meat", "meatless"];

pub const GLUTEN_FREE_PHRASES: &[&str] = &["gluten-free", "gluten free", "no gluten", "celiac"];

pub const DAIRY_FREE_PHRASES: &[&str] = &["dairy-free", "dairy free", "no dairy", "lactose-free"];

pub const NUT_FREE_PHRASES: &[&str] = &["nut-free", "nut free", "no nuts", "allergy-friendly"];

pub const KETO_PHRASES: &[&str] = &["keto", "ketogenic", "low-carb", "low carb"];

pub const PALEO_PHRASES: &[&str] = &["paleo", "paleolithic", "caveman diet"];

/// Cuisine tags keyed by the keywords that suggest them.
pub const CUISINES: &[(&str, &[&str])] = &[
    ("italian", &["italian", "pasta", "pizza", "risotto"]),
    ("mexican", &["mexican", "taco", "salsa", "cilantro"]),
    ("asian", &["asian", "soy sauce", "ginger", "sesame"]),
    (
        "mediterranean",
        &["mediterranean", "olive oil", "feta", "olives"],
    ),
    ("indian", &["indian", "curry", "turmeric", "garam masala"]),
];

/// Cooking-method tags keyed by the keywords that suggest them.
pub const COOKING_METHODS: &[(&str, &[&str])] = &[
    ("baked", &["bake", "oven"]),
    ("grilled", &["grill", "bbq"]),
    ("fried", &["fry", "pan-fried"]),
    ("roasted", &["roast"]),
    ("steamed", &["steam"]),
    ("boiled", &["boil"]),
    ("sautéed", &["sauté", "sauteed"]),
    ("braised", &["braise"]),
];

/// True if any of the given words appears in the (already lowercased) text.
pub fn contains_any(text_lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text_lower.contains(w))
}

/// True if the detection label names something on the food allowlist.
pub fn is_food_label(label: &str) -> bool {
    let label_lower = label.to_lowercase();
    FOOD_DETECTION_ALLOWLIST
        .iter()
        .any(|food| label_lower.contains(food))
}

/// Map a detection label onto the allowlist term it matched.
pub fn food_term_for_label(label: &str) -> Option<&'static str> {
    let label_lower = label.to_lowercase();
    FOOD_DETECTION_ALLOWLIST
        .iter()
        .find(|food| label_lower.contains(**food))
        .copied()
}
