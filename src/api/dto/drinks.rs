/*
 * Responsibility
 * - Request/response DTOs for drinks
 * - Body shape checks (which keys must be present) and recipe normalization
 * - short (public) / long (privileged) projections
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repos::drink_repo::DrinkRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Ingredient with `parts` redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub name: String,
    pub color: String,
}

impl From<Ingredient> for ShortIngredient {
    fn from(i: Ingredient) -> Self {
        Self {
            name: i.name,
            color: i.color,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BodyError {
    MissingField(&'static str),
    Invalid(&'static str),
}

/// One ingredient object, a list of them, or null (no ingredients).
pub fn normalize_recipe(value: Value) -> Result<Vec<Ingredient>, BodyError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(parse_ingredient).collect(),
        obj @ Value::Object(_) => Ok(vec![parse_ingredient(obj)?]),
        _ => Err(BodyError::Invalid("recipe must be an ingredient or a list")),
    }
}

fn parse_ingredient(value: Value) -> Result<Ingredient, BodyError> {
    serde_json::from_value(value).map_err(|_| BodyError::Invalid("invalid ingredient"))
}

fn into_object(body: Value) -> Result<Map<String, Value>, BodyError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(BodyError::Invalid("body must be a JSON object")),
    }
}

fn take_title(fields: &mut Map<String, Value>) -> Result<String, BodyError> {
    match fields.remove("title") {
        None => Err(BodyError::MissingField("title")),
        Some(Value::String(title)) if !title.trim().is_empty() => Ok(title),
        Some(_) => Err(BodyError::Invalid("title must be a non-empty string")),
    }
}

#[derive(Debug)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl CreateDrinkRequest {
    /// Both keys must be present; `recipe` may be null.
    pub fn from_body(body: Value) -> Result<Self, BodyError> {
        let mut fields = into_object(body)?;

        if !fields.contains_key("recipe") {
            return Err(BodyError::MissingField("recipe"));
        }
        let title = take_title(&mut fields)?;
        let recipe = normalize_recipe(fields.remove("recipe").unwrap_or(Value::Null))?;

        Ok(Self { title, recipe })
    }
}

#[derive(Debug)]
pub struct UpdateDrinkRequest {
    pub title: String,
    // None: keep the stored recipe
    pub recipe: Option<Vec<Ingredient>>,
}

impl UpdateDrinkRequest {
    pub fn from_body(body: Value) -> Result<Self, BodyError> {
        let mut fields = into_object(body)?;

        let title = take_title(&mut fields)?;
        let recipe = fields.remove("recipe").map(normalize_recipe).transpose()?;

        Ok(Self { title, recipe })
    }
}

#[derive(Debug, Serialize)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Serialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl TryFrom<DrinkRow> for DrinkLong {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            recipe: serde_json::from_str(&row.recipe)?,
            title: row.title,
        })
    }
}

impl From<DrinkLong> for DrinkShort {
    fn from(drink: DrinkLong) -> Self {
        Self {
            id: drink.id,
            title: drink.title,
            recipe: drink.recipe.into_iter().map(ShortIngredient::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn water() -> Ingredient {
        Ingredient {
            name: "water".into(),
            color: "blue".into(),
            parts: 1,
        }
    }

    #[test]
    fn single_ingredient_is_wrapped_into_a_list() {
        let req = CreateDrinkRequest::from_body(json!({
            "title": "Water",
            "recipe": {"name": "water", "color": "blue", "parts": 1}
        }))
        .unwrap();
        assert_eq!(req.title, "Water");
        assert_eq!(req.recipe, vec![water()]);
    }

    #[test]
    fn list_and_null_recipes_are_accepted() {
        let req = CreateDrinkRequest::from_body(json!({
            "title": "Water",
            "recipe": [{"name": "water", "color": "blue", "parts": 1}]
        }))
        .unwrap();
        assert_eq!(req.recipe, vec![water()]);

        let req = CreateDrinkRequest::from_body(json!({"title": "Air", "recipe": null})).unwrap();
        assert!(req.recipe.is_empty());
    }

    #[test]
    fn create_requires_both_keys() {
        assert_eq!(
            CreateDrinkRequest::from_body(json!({"title": "Water"})).unwrap_err(),
            BodyError::MissingField("recipe")
        );
        assert_eq!(
            CreateDrinkRequest::from_body(json!({"recipe": []})).unwrap_err(),
            BodyError::MissingField("title")
        );
        assert!(matches!(
            CreateDrinkRequest::from_body(json!(["Water"])).unwrap_err(),
            BodyError::Invalid(_)
        ));
    }

    #[test]
    fn blank_title_and_bad_ingredients_are_invalid() {
        assert!(matches!(
            CreateDrinkRequest::from_body(json!({"title": "  ", "recipe": []})).unwrap_err(),
            BodyError::Invalid(_)
        ));
        assert!(matches!(
            CreateDrinkRequest::from_body(json!({
                "title": "Water",
                "recipe": {"name": "water", "color": "blue", "parts": -1}
            }))
            .unwrap_err(),
            BodyError::Invalid(_)
        ));
        assert!(matches!(
            CreateDrinkRequest::from_body(json!({"title": "Water", "recipe": "water"}))
                .unwrap_err(),
            BodyError::Invalid(_)
        ));
    }

    #[test]
    fn update_recipe_is_optional() {
        let req = UpdateDrinkRequest::from_body(json!({"title": "Tea"})).unwrap();
        assert_eq!(req.title, "Tea");
        assert!(req.recipe.is_none());

        let req = UpdateDrinkRequest::from_body(json!({
            "title": "Tea",
            "recipe": {"name": "tea", "color": "brown", "parts": 2}
        }))
        .unwrap();
        assert_eq!(req.recipe.unwrap().len(), 1);

        assert_eq!(
            UpdateDrinkRequest::from_body(json!({"recipe": []})).unwrap_err(),
            BodyError::MissingField("title")
        );
    }

    #[test]
    fn short_projection_drops_parts() {
        let row = DrinkRow {
            id: 7,
            title: "Water".into(),
            recipe: serde_json::to_string(&vec![water()]).unwrap(),
        };
        let short = DrinkShort::from(DrinkLong::try_from(row).unwrap());

        let value = serde_json::to_value(&short).unwrap();
        assert_eq!(
            value,
            json!({"id": 7, "title": "Water", "recipe": [{"name": "water", "color": "blue"}]})
        );
    }
}
