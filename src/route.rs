use std::fmt;

use crate::bank::Skill;

/// Screen addressed by a path, as accepted by `--route`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Catalog,
    TestList(Skill),
    Test { skill: Skill, test_id: String },
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, String> {
        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] | ["mock-tests"] => Ok(Route::Catalog),
            ["mock-tests", skill] => Ok(Route::TestList(parse_skill(skill, path)?)),
            ["test", skill, test_id] => Ok(Route::Test {
                skill: parse_skill(skill, path)?,
                test_id: (*test_id).to_string(),
            }),
            _ => Err(format!("no page at `{path}`")),
        }
    }
}

fn parse_skill(segment: &str, path: &str) -> Result<Skill, String> {
    segment
        .parse()
        .map_err(|_| format!("no page at `{path}`: unknown skill `{segment}`"))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Catalog => f.write_str("/mock-tests"),
            Route::TestList(skill) => write!(f, "/mock-tests/{skill}"),
            Route::Test { skill, test_id } => write!(f, "/test/{skill}/{test_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_catalog() {
        assert_eq!(Route::parse("/"), Ok(Route::Catalog));
        assert_eq!(Route::parse("/mock-tests"), Ok(Route::Catalog));
        assert_eq!(Route::parse("/mock-tests/"), Ok(Route::Catalog));
    }

    #[test]
    fn skill_list_and_test() {
        assert_eq!(
            Route::parse("/mock-tests/Reading"),
            Ok(Route::TestList(Skill::Reading))
        );
        assert_eq!(
            Route::parse("/test/listening/listening-sample-1"),
            Ok(Route::Test {
                skill: Skill::Listening,
                test_id: "listening-sample-1".to_string()
            })
        );
    }

    #[test]
    fn unknown_paths_are_errors() {
        assert!(Route::parse("/settings").is_err());
        assert!(Route::parse("/test/cooking/abc").unwrap_err().contains("cooking"));
        assert!(Route::parse("/test/reading").is_err());
    }

    #[test]
    fn display_matches_parse() {
        let route = Route::Test {
            skill: Skill::Speaking,
            test_id: "s1".to_string(),
        };
        assert_eq!(Route::parse(&route.to_string()), Ok(route));
    }
}
