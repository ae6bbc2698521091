//! Category table loading
//!
//! Categories live in a small YAML file:
//!
//! ```yaml
//! - id: 1
//!   name: 식비
//!   icon: restaurant
//! ```

use crate::error::{RepositoryError, RepositoryResult};
use crate::model::expense::Category;
use std::fs;
use std::path::Path;

/// Load categories from `path`, or the built-in table when no file exists
pub fn load_categories(path: Option<&Path>) -> RepositoryResult<Vec<Category>> {
    let Some(path) = path else {
        return Ok(Category::defaults());
    };

    if !path.exists() {
        tracing::debug!("category file {} not found, using defaults", path.display());
        return Ok(Category::defaults());
    }

    let contents = fs::read_to_string(path).map_err(|e| RepositoryError::io(path, e))?;
    parse_categories(&contents).map_err(|source| RepositoryError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_categories(contents: &str) -> Result<Vec<Category>, serde_yaml::Error> {
    serde_yaml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expense::CategoryId;

    #[test]
    fn test_parse_categories() {
        let yaml = r#"
- id: 1
  name: 식비
  icon: restaurant
- id: 9
  name: Gifts
"#;
        let categories = parse_categories(yaml).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, CategoryId(1));
        assert_eq!(categories[0].icon.as_deref(), Some("restaurant"));
        assert_eq!(categories[1].icon, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("accountbook-no-such-categories.yml");
        let categories = load_categories(Some(&path)).unwrap();
        assert_eq!(categories, Category::defaults());
        assert_eq!(load_categories(None).unwrap(), Category::defaults());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(parse_categories("- id: not-a-number\n  name: x").is_err());
    }
}
