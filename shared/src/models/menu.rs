//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu category, fixed set offered by the staff UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuCategory {
    Starter,
    #[serde(rename = "Main Course")]
    MainCourse,
    Dessert,
    Beverages,
    Snacks,
}

impl MenuCategory {
    /// All categories, in display order
    pub const ALL: [MenuCategory; 5] = [
        MenuCategory::Starter,
        MenuCategory::MainCourse,
        MenuCategory::Dessert,
        MenuCategory::Beverages,
        MenuCategory::Snacks,
    ];

    /// Wire/display label (matches the remote `category` column values)
    pub fn label(&self) -> &'static str {
        match self {
            MenuCategory::Starter => "Starter",
            MenuCategory::MainCourse => "Main Course",
            MenuCategory::Dessert => "Dessert",
            MenuCategory::Beverages => "Beverages",
            MenuCategory::Snacks => "Snacks",
        }
    }
}

impl std::fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Menu item entity, mirroring a row of the remote `menu` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Price in whole currency units
    pub price: i64,
    pub category: MenuCategory,
    /// Whether the item is shown to guests. The remote column is
    /// capitalized; rows predating the column default to visible.
    #[serde(rename = "Visibility", default = "default_true")]
    pub visibility: bool,
}

fn default_true() -> bool {
    true
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price: i64,
    pub category: MenuCategory,
}

/// Update menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: String,
    pub price: i64,
    pub category: MenuCategory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_wire_strings_round_trip() {
        for category in MenuCategory::ALL {
            let s = serde_json::to_string(&category).unwrap();
            assert_eq!(s, format!("\"{}\"", category.label()));
            let back: MenuCategory = serde_json::from_str(&s).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn visibility_defaults_to_true() {
        let row = json!({ "id": 3, "name": "Gulab Jamun", "price": 60, "category": "Dessert" });
        let item: MenuItem = serde_json::from_value(row).unwrap();
        assert!(item.visibility);
    }

    #[test]
    fn visibility_column_is_capitalized() {
        let row = json!({
            "id": 3,
            "name": "Gulab Jamun",
            "price": 60,
            "category": "Dessert",
            "Visibility": false
        });
        let item: MenuItem = serde_json::from_value(row).unwrap();
        assert!(!item.visibility);
    }
}
