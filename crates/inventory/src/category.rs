use serde::Serialize;

/// A fixed inventory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}

pub const CATEGORIES: [Category; 12] = [
    Category { id: "blues", name: "Blues Uniform Items" },
    Category { id: "ocp", name: "OCP/ABU Uniform Items" },
    Category { id: "pt", name: "PT Gear" },
    Category { id: "drill", name: "Drill & Ceremonial Equipment" },
    Category { id: "raider", name: "Raider / PT Equipment" },
    Category { id: "marksmanship", name: "Marksmanship Equipment" },
    Category { id: "field", name: "Field & Event Gear" },
    Category { id: "classroom", name: "Classroom & Office Supplies" },
    Category { id: "awards", name: "Awards & Recognition" },
    Category { id: "storage", name: "Logistics & Storage Items" },
    Category { id: "public", name: "Public Affairs Equipment" },
    Category { id: "training", name: "Leadership & Training Materials" },
];

pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        assert_eq!(find_category("pt").map(|c| c.name), Some("PT Gear"));
        assert!(find_category("uniforms").is_none());
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = CATEGORIES.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), CATEGORIES.len());
    }
}
