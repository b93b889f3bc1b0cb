use serde::Serialize;

use crate::models::question::Level;

#[derive(Debug, Clone, Serialize)]
pub struct RoleInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub technologies: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelInfo {
    pub value: Level,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub roles: &'static [RoleInfo],
    pub levels: Vec<LevelInfo>,
}

pub const ROLES: &[RoleInfo] = &[
    RoleInfo {
        slug: "frontend",
        title: "Frontend Developer",
        description: "Master UI development concepts and modern framework patterns",
        technologies: &["React", "Angular", "Vue", "CSS"],
    },
    RoleInfo {
        slug: "backend",
        title: "Backend Developer",
        description: "Test your knowledge of server-side technologies and APIs",
        technologies: &["Node.js", "Express", "Django", "Spring Boot"],
    },
    RoleInfo {
        slug: "qa",
        title: "QA Engineer",
        description: "Validate your testing methodologies and automation skills",
        technologies: &["Selenium", "Jest", "Cypress", "JIRA"],
    },
    RoleInfo {
        slug: "data-analyst",
        title: "Data Analyst",
        description: "Demonstrate your data manipulation and visualization expertise",
        technologies: &["SQL", "Python", "Tableau", "Pandas"],
    },
    RoleInfo {
        slug: "ml-engineer",
        title: "Machine Learning Engineer",
        description: "Prove your ML algorithm knowledge and model deployment skills",
        technologies: &["TensorFlow", "PyTorch", "Scikit-learn", "Keras"],
    },
    RoleInfo {
        slug: "cpp-developer",
        title: "C++ Developer",
        description: "Test your low-level programming and system design knowledge",
        technologies: &["C++17", "STL", "Multithreading", "Templates"],
    },
];

pub fn catalog() -> Catalog {
    Catalog {
        roles: ROLES,
        levels: Level::ALL
            .iter()
            .map(|&value| LevelInfo {
                value,
                label: value.label(),
            })
            .collect(),
    }
}

/// Display title for a predefined role slug.
pub fn role_title(slug: &str) -> Option<&'static str> {
    ROLES.iter().find(|r| r.slug == slug).map(|r| r.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_all_levels_in_order() {
        let c = catalog();
        let values: Vec<_> = c.levels.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["fresher", "junior", "mid-level", "senior"]);
        assert_eq!(c.roles.len(), 6);
    }

    #[test]
    fn test_role_title_lookup() {
        assert_eq!(role_title("cpp-developer"), Some("C++ Developer"));
        assert_eq!(role_title("astronaut"), None);
    }
}
