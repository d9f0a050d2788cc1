//! Feature files, parsed with the `gherkin` crate and flattened into
//! runnable scenarios.
//!
//! - `Background:` steps of the feature, then of the enclosing `Rule:`, run
//!   before every scenario (see [`Feature::steps_of`])
//! - `Scenario Outline:` is expanded into one scenario per `Examples:` row,
//!   with `<column>` placeholders substituted in names, steps, doc strings
//!   and data tables
//! - doc strings lose their surrounding blank lines and common indentation

use std::path::Path;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("{source_name}: outline '{scenario}' has an Examples table without a header row")]
    EmptyExamples {
        source_name: String,
        scenario: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub keyword: String,
    pub text: String,
    pub docstring: Option<String>,
    /// Data table rows, header row included.
    pub table: Option<Vec<Vec<String>>>,
    /// 1-based source line.
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    /// Background of the enclosing rule, if any.
    pub background: Vec<Step>,
    pub steps: Vec<Step>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub tags: Vec<String>,
    pub background: Vec<Step>,
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let parsed = gherkin::Feature::parse_path(path, gherkin::GherkinEnv::default())
            .map_err(|e| FeatureError::Parse {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?;
        Self::flatten(parsed, &source_name)
    }

    pub fn parse(source: &str) -> Result<Self, FeatureError> {
        let parsed = gherkin::Feature::parse(source, gherkin::GherkinEnv::default()).map_err(
            |e| FeatureError::Parse {
                source_name: "feature".to_string(),
                reason: e.to_string(),
            },
        )?;
        Self::flatten(parsed, "feature")
    }

    /// Background steps followed by the scenario's own steps.
    pub fn steps_of<'a>(&'a self, scenario: &'a Scenario) -> impl Iterator<Item = &'a Step> {
        self.background
            .iter()
            .chain(scenario.background.iter())
            .chain(scenario.steps.iter())
    }

    fn flatten(parsed: gherkin::Feature, source_name: &str) -> Result<Self, FeatureError> {
        let mut scenarios = Vec::new();
        for scenario in &parsed.scenarios {
            expand(scenario, &[], &mut scenarios, source_name)?;
        }
        for rule in &parsed.rules {
            let background = steps(rule.background.as_ref().map(|b| b.steps.as_slice()));
            for scenario in &rule.scenarios {
                expand(scenario, &background, &mut scenarios, source_name)?;
            }
        }

        Ok(Feature {
            name: parsed.name.trim().to_string(),
            tags: tags(&parsed.tags),
            background: steps(parsed.background.as_ref().map(|b| b.steps.as_slice())),
            scenarios,
        })
    }
}

fn tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|tag| format!("@{}", tag.trim_start_matches('@')))
        .collect()
}

fn steps(raw: Option<&[gherkin::Step]>) -> Vec<Step> {
    raw.unwrap_or_default().iter().map(step).collect()
}

fn step(raw: &gherkin::Step) -> Step {
    Step {
        keyword: raw.keyword.trim().to_string(),
        text: raw.value.trim().to_string(),
        docstring: raw.docstring.as_deref().map(doc_string),
        table: raw.table.as_ref().map(|t| t.rows.clone()),
        line: raw.position.line,
    }
}

/// Push `raw` as is, or one scenario per example row for an outline.
fn expand(
    raw: &gherkin::Scenario,
    background: &[Step],
    out: &mut Vec<Scenario>,
    source_name: &str,
) -> Result<(), FeatureError> {
    let template = Scenario {
        name: raw.name.trim().to_string(),
        tags: tags(&raw.tags),
        background: background.to_vec(),
        steps: raw.steps.iter().map(step).collect(),
        line: raw.position.line,
    };
    if raw.examples.is_empty() {
        out.push(template);
        return Ok(());
    }

    let mut row_number = 0;
    for examples in &raw.examples {
        let Some(table) = &examples.table else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            return Err(FeatureError::EmptyExamples {
                source_name: source_name.to_string(),
                scenario: template.name.clone(),
            });
        };

        for (offset, row) in rows.iter().enumerate() {
            row_number += 1;
            let bindings: Vec<(String, &str)> = header
                .iter()
                .zip(row)
                .map(|(column, value)| (format!("<{column}>"), value.as_str()))
                .collect();
            let fill = |text: &str| substitute(text, &bindings);

            let name = fill(template.name.as_str());
            let mut tags = template.tags.clone();
            tags.extend(self::tags(&examples.tags));
            out.push(Scenario {
                name: if name == template.name {
                    format!("{name} #{row_number}")
                } else {
                    name
                },
                tags,
                background: template.background.clone(),
                steps: template
                    .steps
                    .iter()
                    .map(|s| Step {
                        keyword: s.keyword.clone(),
                        text: fill(s.text.as_str()),
                        docstring: s.docstring.as_deref().map(fill),
                        table: s.table.as_ref().map(|rows| {
                            rows.iter()
                                .map(|cells| cells.iter().map(|c| fill(c.as_str())).collect())
                                .collect()
                        }),
                        line: s.line,
                    })
                    .collect(),
                line: table.position.line + offset + 1,
            });
        }
    }
    Ok(())
}

fn substitute(text: &str, bindings: &[(String, &str)]) -> String {
    bindings
        .iter()
        .fold(text.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder.as_str(), value)
        })
}

/// Trim blank edge lines and the indentation shared by every other line.
fn doc_string(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let body = &lines[start..=end];

    let indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
# Users API
Feature: Users
  Exercise the users endpoints.

  Background:
    Given a HttpRequest "create"

  @smoke @users
  Scenario: create a user
    When HttpRequest "create" body is:
      """
      {
        "name": "alice"
      }
      """
    And HttpRequest "create" is submitted
    Then response status code should be 201
    * response body $.name should be equal to "alice"

  Scenario: list users
    Given a HttpRequest "list"
    But HttpRequest "list" is submitted
"#;

    #[test]
    fn test_parse_feature() {
        let feature = Feature::parse(SOURCE).unwrap();
        assert_eq!(feature.name, "Users");
        assert_eq!(feature.background.len(), 1);
        assert_eq!(feature.scenarios.len(), 2);

        let create = &feature.scenarios[0];
        assert_eq!(create.name, "create a user");
        assert_eq!(create.tags, vec!["@smoke", "@users"]);
        assert_eq!(create.steps.len(), 4);
        assert_eq!(create.steps[0].keyword, "When");
        assert_eq!(
            create.steps[0].docstring.as_deref(),
            Some("{\n  \"name\": \"alice\"\n}")
        );
        assert_eq!(create.steps[3].keyword, "*");
        assert_eq!(create.steps[3].text, r#"response body $.name should be equal to "alice""#);

        assert!(feature.scenarios[1].tags.is_empty());
        let steps: Vec<&str> = feature
            .steps_of(&feature.scenarios[1])
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(
            steps,
            vec![
                r#"a HttpRequest "create""#,
                r#"a HttpRequest "list""#,
                r#"HttpRequest "list" is submitted"#
            ]
        );
    }

    #[test]
    fn test_step_line_numbers() {
        let feature = Feature::parse("Feature: f\n  Scenario: s\n    Given a HttpRequest\n").unwrap();
        assert_eq!(feature.scenarios[0].line, 2);
        assert_eq!(feature.scenarios[0].steps[0].line, 3);
    }

    #[test]
    fn test_scenario_outline_is_expanded() {
        let feature = Feature::parse(
            r#"Feature: outlines
  Scenario Outline: fetch <alias>
    Given a HttpRequest "<alias>"
    And HttpRequest "<alias>" path is "/users/<id>"

    Examples:
      | alias | id    |
      | one   | usr_1 |
      | two   | usr_2 |
"#,
        )
        .unwrap();

        let names: Vec<&str> = feature.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["fetch one", "fetch two"]);

        let two = &feature.scenarios[1];
        assert_eq!(two.steps[0].text, r#"a HttpRequest "two""#);
        assert_eq!(two.steps[1].text, r#"HttpRequest "two" path is "/users/usr_2""#);
        assert_eq!(two.steps[1].line, 4);
        assert_eq!(two.line, 9);
    }

    #[test]
    fn test_data_tables_are_kept() {
        let feature = Feature::parse(
            r#"Feature: tables
  Scenario: headers
    Given a HttpRequest
    And HttpRequest headers are:
      | accept       | application/json |
      | x-request-id | req-1            |
"#,
        )
        .unwrap();

        let step = &feature.scenarios[0].steps[1];
        assert_eq!(step.text, "HttpRequest headers are:");
        assert_eq!(
            step.table,
            Some(vec![
                vec!["accept".to_string(), "application/json".to_string()],
                vec!["x-request-id".to_string(), "req-1".to_string()],
            ])
        );
    }

    #[test]
    fn test_rule_background_runs_after_feature_background() {
        let feature = Feature::parse(
            r#"Feature: rules
  Background:
    Given a HttpRequest "base"

  Rule: authenticated
    Background:
      Given an Entity "admin" with username "a" and password "b"

    Scenario: inside the rule
      When HttpRequest "base" is submitted
"#,
        )
        .unwrap();

        let scenario = &feature.scenarios[0];
        let steps: Vec<&str> = feature.steps_of(scenario).map(|s| s.text.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                r#"a HttpRequest "base""#,
                r#"an Entity "admin" with username "a" and password "b""#,
                r#"HttpRequest "base" is submitted"#
            ]
        );
    }

    #[test]
    fn test_missing_feature_header() {
        let err = Feature::parse("Scenario: s\n  Given x\n").unwrap_err();
        assert!(matches!(err, FeatureError::Parse { .. }));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Feature::from_file(dir.path().join("missing.feature")).unwrap_err();
        assert!(matches!(err, FeatureError::Parse { ref source_name, .. } if source_name.ends_with("missing.feature")));
    }

    #[test]
    fn test_doc_string_indentation() {
        assert_eq!(doc_string("\n    a\n      b\n    "), "a\n  b");
        assert_eq!(doc_string("a\nb"), "a\nb");
        assert_eq!(doc_string("\n   \n"), "");
    }
}
