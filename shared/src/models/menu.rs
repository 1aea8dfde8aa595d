//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity, owned by exactly one restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique within the owning restaurant's menu
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    /// Photo reference (file name served by the image host)
    #[serde(default)]
    pub photo: Option<String>,
    pub available: bool,
}

/// Create menu item payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// Update menu item payload (identified by name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl From<MenuItemCreate> for MenuItem {
    fn from(create: MenuItemCreate) -> Self {
        Self {
            name: create.name,
            price: create.price,
            description: create.description,
            photo: create.photo,
            available: create.available.unwrap_or(true),
        }
    }
}

impl MenuItem {
    /// Apply an update payload in place
    pub fn apply(&mut self, update: &MenuItemUpdate) {
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(photo) = &update.photo {
            self.photo = Some(photo.clone());
        }
        if let Some(available) = update.available {
            self.available = available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_to_available() {
        let item: MenuItem = MenuItemCreate {
            name: "Taco".into(),
            price: 3.5,
            description: String::new(),
            photo: None,
            available: None,
        }
        .into();
        assert!(item.available);
    }

    #[test]
    fn test_apply_partial_update() {
        let mut item = MenuItem {
            name: "Taco".into(),
            price: 3.5,
            description: "corn".into(),
            photo: None,
            available: true,
        };
        item.apply(&MenuItemUpdate {
            name: "Taco".into(),
            price: Some(4.0),
            description: None,
            photo: None,
            available: Some(false),
        });
        assert_eq!(item.price, 4.0);
        assert_eq!(item.description, "corn");
        assert!(!item.available);
    }
}
