//! Prompt construction and model-output parsing
//!
//! Models wrap JSON in prose or code fences often enough that every
//! structured call goes through `extract_json`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AiError;
use crate::cart::models::{Cart, CartItem};

pub fn instructions_prompt(instructions: &str) -> String {
    format!(
        "Analyze the following food order instructions and extract key information:\n\
         {instructions}\n\n\
         Return a JSON object with the following structure:\n\
         {{\n  \
           \"spice_level\": \"mild/medium/hot\",\n  \
           \"allergies\": [\"list\", \"of\", \"allergies\"],\n  \
           \"preferences\": [\"list\", \"of\", \"preferences\"],\n  \
           \"special_requests\": [\"list\", \"of\", \"special\", \"requests\"]\n\
         }}"
    )
}

pub fn summary_prompt(cart: &Cart) -> Result<String, AiError> {
    let order = serde_json::to_string_pretty(cart).map_err(|e| AiError::Parse(e.to_string()))?;
    Ok(format!(
        "Create a natural language summary of the following food order:\n\
         {order}\n\n\
         Focus on:\n\
         1. Total number of items\n\
         2. Special instructions\n\
         3. Notable combinations\n\
         4. Any dietary considerations"
    ))
}

pub fn suggestions_prompt(items: &[CartItem], preferences: &[String]) -> Result<String, AiError> {
    let items = serde_json::to_string_pretty(items).map_err(|e| AiError::Parse(e.to_string()))?;
    let preferences =
        serde_json::to_string_pretty(preferences).map_err(|e| AiError::Parse(e.to_string()))?;
    Ok(format!(
        "Based on the current cart items:\n{items}\n\n\
         And user preferences:\n{preferences}\n\n\
         Suggest additional items that would complement the order.\n\
         Return a JSON array of item IDs."
    ))
}

/// Locates the JSON document inside raw model output and decodes it.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let trimmed = strip_code_fence(raw.trim());

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    // Fall back to the outermost object or array embedded in prose.
    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| AiError::Parse(e.to_string())),
        _ => Err(AiError::Parse("no JSON document in model output".into())),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Reads item ids from either a bare array or an object holding one.
pub fn suggestion_ids(value: Value) -> Result<Vec<String>, AiError> {
    let list = match value {
        Value::Array(list) => list,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(list) => Some(list),
                _ => None,
            })
            .ok_or_else(|| AiError::Parse("expected a list of item ids".into()))?,
        _ => return Err(AiError::Parse("expected a list of item ids".into())),
    };

    Ok(list
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Object(mut obj) => obj
                .remove("item_id")
                .or_else(|| obj.remove("id"))
                .and_then(|id| id.as_str().map(str::to_string)),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::models::InstructionAnalysis;
    use serde_json::json;

    #[test]
    fn test_extract_json_variants() {
        let plain: InstructionAnalysis =
            extract_json(r#"{"spice_level":"hot","allergies":["peanuts"]}"#).unwrap();
        assert_eq!(plain.spice_level.as_deref(), Some("hot"));
        assert_eq!(plain.allergies, vec!["peanuts".to_string()]);

        let fenced: InstructionAnalysis =
            extract_json("```json\n{\"preferences\": \"vegetarian\"}\n```").unwrap();
        assert_eq!(fenced.preferences, vec!["vegetarian".to_string()]);

        let prose: InstructionAnalysis =
            extract_json("Sure! Here it is: {\"allergies\": null} Enjoy.").unwrap();
        assert!(prose.allergies.is_empty());

        assert!(matches!(
            extract_json::<InstructionAnalysis>("no json here"),
            Err(AiError::Parse(_))
        ));
    }

    #[test]
    fn test_suggestion_ids_shapes() {
        assert_eq!(
            suggestion_ids(json!(["fries", "soda"])).unwrap(),
            vec!["fries", "soda"]
        );
        assert_eq!(
            suggestion_ids(json!({"suggestions": [{"item_id": "salad"}, 3, ""]})).unwrap(),
            vec!["salad"]
        );
        assert!(suggestion_ids(json!("fries")).is_err());
    }

    #[test]
    fn test_prompts_embed_context() {
        assert!(instructions_prompt("no onions").contains("no onions"));

        let mut cart = Cart::new("c1");
        cart.items.push(CartItem::new("burger", 2));
        assert!(summary_prompt(&cart).unwrap().contains("\"burger\""));

        let prompt = suggestions_prompt(&cart.items, &["vegan".to_string()]).unwrap();
        assert!(prompt.contains("vegan"));
    }
}
