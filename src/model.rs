//! Family documents stored by the sample.
//!
//! These are plain value types. Field names serialize in camelCase and
//! absent optional fields are left out of the stored JSON.

use serde::{Deserialize, Serialize};

/// A family document, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    /// Unique document id.
    pub id: String,
    /// Family surname.
    #[serde(default)]
    pub last_name: String,
    /// School district.
    #[serde(default)]
    pub district: String,
    /// Whether the family is registered.
    #[serde(default)]
    pub registered: bool,
    /// Parents, in order.
    #[serde(default)]
    pub parents: Vec<Parent>,
    /// Children, in order.
    #[serde(default)]
    pub children: Vec<Child>,
    /// Home address.
    #[serde(default)]
    pub address: Address,
}

/// A parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    /// Surname, when it differs from the family's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Given name.
    pub first_name: String,
}

/// A child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    /// Surname, when it differs from the family's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Gender, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// School grade.
    #[serde(default)]
    pub grade: i32,
    /// Pets, in order.
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// A pet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// The pet's name.
    pub given_name: String,
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// City.
    pub city: String,
    /// County.
    pub county: String,
    /// State or province.
    pub state: String,
}

impl Parent {
    /// Parent with only a given name.
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            family_name: None,
            first_name: first_name.into(),
        }
    }

    /// Set the surname.
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }
}

impl Child {
    /// Child with a given name and grade.
    pub fn new(first_name: impl Into<String>, grade: i32) -> Self {
        Self {
            first_name: first_name.into(),
            grade,
            ..Self::default()
        }
    }

    /// Set the surname.
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    /// Set the gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Add a pet.
    pub fn with_pet(mut self, given_name: impl Into<String>) -> Self {
        self.pets.push(Pet {
            given_name: given_name.into(),
        });
        self
    }
}

impl Address {
    /// Create an address.
    pub fn new(city: impl Into<String>, county: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            county: county.into(),
            state: state.into(),
        }
    }
}
