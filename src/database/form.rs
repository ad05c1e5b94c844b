use std::collections::HashMap;

use serde_json::Value;

use super::{error::TypeError, schema::NewRecipe};

pub type FormData = HashMap<String, Value>;

/// Submitted field values, decoded on demand.
pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn get_str(&self, key: &str) -> Result<String, TypeError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(v.to_string()),
                None => Err(TypeError::new(&format!("Field '{key}' is not a string"))),
            },
            None => Err(TypeError::new(&format!("Missing field '{key}'"))),
        }
    }

    /// Absent, null and blank values all read as `None`.
    pub fn get_optional_str(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
            Some(Value::String(v)) => Ok(Some(v.to_owned())),
            Some(_) => Err(TypeError::new(&format!("Field '{key}' is not a string"))),
        }
    }
}

impl NewRecipe {
    pub fn from_form(form: &Form) -> Result<Self, TypeError> {
        let name = form.get_str("name")?;
        if name.trim().is_empty() {
            return Err(TypeError::new("Recipe name can't be empty"));
        }

        Ok(Self {
            name,
            description: form.get_str("description")?,
            photo: form.get_optional_str("photo")?,
            custom_text: form.get_optional_str("custom_text")?,
        })
    }
}
