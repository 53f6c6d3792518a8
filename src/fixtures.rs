//! Sample families inserted by the walkthrough.

use crate::model::{Address, Child, Family, Parent};

/// The Andersen family, `Andersen.1`.
pub fn andersen_family() -> Family {
    Family {
        id: "Andersen.1".to_string(),
        last_name: "Andersen".to_string(),
        district: "WA5".to_string(),
        registered: true,
        parents: vec![Parent::new("Thomas"), Parent::new("Mary Kay")],
        children: vec![Child::new("Henriette Thaulow", 5)
            .with_gender("female")
            .with_pet("Fluffy")],
        address: Address::new("Seattle", "King", "WA"),
    }
}

/// The Wakefield family, `Wakefield.7`.
pub fn wakefield_family() -> Family {
    Family {
        id: "Wakefield.7".to_string(),
        last_name: "Wakefield".to_string(),
        district: "NY23".to_string(),
        registered: true,
        parents: vec![
            Parent::new("Robin").with_family_name("Wakefield"),
            Parent::new("Ben").with_family_name("Miller"),
        ],
        children: vec![
            Child::new("Jesse", 8)
                .with_family_name("Merriam")
                .with_pet("Goofy")
                .with_pet("Shadow"),
            Child::new("Lisa", 1)
                .with_family_name("Miller")
                .with_gender("female"),
        ],
        address: Address::new("NY", "Manhattan", "NY"),
    }
}

/// Both sample families, in insertion order.
pub fn sample_families() -> Vec<Family> {
    vec![andersen_family(), wakefield_family()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_andersen_document_shape() {
        let value = serde_json::to_value(andersen_family()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "Andersen.1",
                "lastName": "Andersen",
                "district": "WA5",
                "registered": true,
                "parents": [{"firstName": "Thomas"}, {"firstName": "Mary Kay"}],
                "children": [{
                    "firstName": "Henriette Thaulow",
                    "gender": "female",
                    "grade": 5,
                    "pets": [{"givenName": "Fluffy"}]
                }],
                "address": {"city": "Seattle", "county": "King", "state": "WA"}
            })
        );
    }

    #[test]
    fn test_wakefield_children() {
        let family = wakefield_family();
        assert_eq!(family.children.len(), 2);
        assert_eq!(family.children[0].first_name, "Jesse");
        assert_eq!(family.children[0].grade, 8);
        assert_eq!(family.children[0].gender, None);
        assert_eq!(family.children[0].pets.len(), 2);
        assert_eq!(family.children[1].first_name, "Lisa");
        assert_eq!(family.children[1].gender.as_deref(), Some("female"));
    }

    #[test]
    fn test_fixtures_are_pure() {
        assert_eq!(andersen_family(), andersen_family());
        let ids: Vec<_> = sample_families().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, ["Andersen.1", "Wakefield.7"]);
    }
}
