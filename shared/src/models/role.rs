//! Role Model

use serde::{Deserialize, Serialize};

/// Caller role, as stored in `users/{uid}.role_name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    RestaurantAdmin,
    Cashier,
    Chef,
    Driver,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::RestaurantAdmin => "restaurant_admin",
            Self::Cashier => "cashier",
            Self::Chef => "chef",
            Self::Driver => "driver",
            Self::Other(s) => s,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Whether this role may read orders and kitchen tickets of `restaurant_id`
    ///
    /// Super admins see every restaurant; staff roles only the one their
    /// profile is bound to. Drivers and unknown roles see nothing.
    pub fn can_read_restaurant(&self, restaurant_id: &str, bound_to: Option<&str>) -> bool {
        match self {
            Self::SuperAdmin => true,
            Self::RestaurantAdmin | Self::Cashier | Self::Chef => bound_to == Some(restaurant_id),
            Self::Driver | Self::Other(_) => false,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "super_admin" => Self::SuperAdmin,
            "restaurant_admin" => Self::RestaurantAdmin,
            "cashier" => Self::Cashier,
            "chef" => Self::Chef,
            "driver" => Self::Driver,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// User profile (`users/{uid}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub restaurant_id: Option<String>,
    pub role_name: Role,
}
