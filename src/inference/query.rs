//! Text form of queries and answers.
//!
//! Two kinds of lines are understood:
//!
//! * `P(B=T|J=T,M=T) A-E` asks for a posterior, optionally followed by an
//!   elimination order joined with `-`.
//! * `B-E|J=T` asks whether two variables are independent given the names on
//!   the right; observed values, if written, are ignored.

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::common::errors::{BayesError, Result};
use crate::model::network::BayesianNetwork;

use super::bayes_ball::BayesBall;
use super::elimination::{InferenceResult, Query, VariableElimination};

pub const DEFAULT_PRECISION: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryLine {
    Elimination(Query),
    Independence {
        first: String,
        second: String,
        evidence: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Elimination(InferenceResult),
    Independence { independent: bool },
}

impl Answer {
    /// `probability,additions,multiplications` or `yes`/`no`.
    pub fn render(&self, precision: usize) -> String {
        match self {
            Answer::Elimination(result) => format!(
                "{:.*},{},{}",
                precision, result.probability, result.additions, result.multiplications
            ),
            Answer::Independence { independent: true } => "yes".to_string(),
            Answer::Independence { independent: false } => "no".to_string(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_PRECISION))
    }
}

impl fmt::Display for QueryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLine::Elimination(query) => {
                write!(f, "P({}={}", query.variable, query.value)?;
                if !query.evidence.is_empty() {
                    let evidence: Vec<String> = query
                        .evidence
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect();
                    write!(f, "|{}", evidence.join(","))?;
                }
                write!(f, ")")?;
                if !query.order.is_empty() {
                    write!(f, " {}", query.order.join("-"))?;
                }
                Ok(())
            }
            QueryLine::Independence {
                first,
                second,
                evidence,
            } => write!(f, "{}-{}|{}", first, second, evidence.join(",")),
        }
    }
}

pub fn parse_query_line(line: &str) -> Result<QueryLine> {
    let line = line.trim();
    if let Some(body) = line.strip_prefix("P(") {
        parse_elimination(body)
    } else {
        parse_independence(line)
    }
}

/// Parse every query in `text`, skipping blank lines and `#` comments.
/// Errors carry the 1-based line number.
pub fn parse_queries(text: &str) -> Result<Vec<QueryLine>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            parse_query_line(line).map_err(|err| match err {
                BayesError::Parse(message) => {
                    BayesError::Parse(format!("line {}: {}", number + 1, message))
                }
                other => other,
            })
        })
        .collect()
}

pub fn answer(network: &BayesianNetwork, line: &QueryLine) -> Result<Answer> {
    trace!("answer - Start {}", line);
    let answer = match line {
        QueryLine::Elimination(query) => {
            Answer::Elimination(VariableElimination::new(network).infer(query)?)
        }
        QueryLine::Independence {
            first,
            second,
            evidence,
        } => Answer::Independence {
            independent: BayesBall::new(network).is_independent(first, second, evidence)?,
        },
    };
    trace!("answer - End {}", answer);
    Ok(answer)
}

fn parse_elimination(body: &str) -> Result<QueryLine> {
    let (inner, rest) = body
        .split_once(')')
        .ok_or_else(|| BayesError::Parse(format!("missing ')' in 'P({}'", body)))?;
    let (target, evidence) = match inner.split_once('|') {
        Some((target, evidence)) => (target, evidence),
        None => (inner, ""),
    };

    let (variable, value) = parse_assignment(target)?;
    let mut query = Query::new(variable, value);
    for term in evidence.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (name, value) = parse_assignment(term)?;
        query = query.given(name, value);
    }

    let rest = rest.trim();
    if !rest.is_empty() {
        let order = rest
            .split('-')
            .map(|name| parse_name(name, rest))
            .collect::<Result<Vec<_>>>()?;
        query = query.with_order(order);
    }
    Ok(QueryLine::Elimination(query))
}

fn parse_independence(line: &str) -> Result<QueryLine> {
    let (pair, evidence) = match line.split_once('|') {
        Some((pair, evidence)) => (pair, evidence),
        None => (line, ""),
    };
    let (first, second) = pair
        .split_once('-')
        .ok_or_else(|| BayesError::Parse(format!("expected 'X-Y' in '{}'", line)))?;

    let evidence = evidence
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            let name = term.split_once('=').map_or(term, |(name, _)| name);
            parse_name(name, line).map(str::to_string)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QueryLine::Independence {
        first: parse_name(first, line)?.to_string(),
        second: parse_name(second, line)?.to_string(),
        evidence,
    })
}

fn parse_assignment(term: &str) -> Result<(&str, &str)> {
    let (name, value) = term
        .split_once('=')
        .ok_or_else(|| BayesError::Parse(format!("expected 'Name=value' but found '{}'", term)))?;
    Ok((parse_name(name, term)?, parse_name(value, term)?))
}

fn parse_name<'a>(name: &'a str, context: &str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        Err(BayesError::Parse(format!("empty name in '{}'", context)))
    } else {
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_elimination_query() {
        let line = parse_query_line("P(B=T|J=T,M=T) A-E").unwrap();
        let expected = Query::new("B", "T")
            .given("J", "T")
            .given("M", "T")
            .with_order(["A", "E"]);
        assert_eq!(line, QueryLine::Elimination(expected));
        assert_eq!(line.to_string(), "P(B=T|J=T,M=T) A-E");
    }

    #[test]
    fn test_parse_bare_elimination_query() {
        let line = parse_query_line("P(B=T)").unwrap();
        assert_eq!(line, QueryLine::Elimination(Query::new("B", "T")));
    }

    #[test]
    fn test_parse_independence_query() {
        let line = parse_query_line("B-E|J=T,M=F").unwrap();
        assert_eq!(
            line,
            QueryLine::Independence {
                first: "B".to_string(),
                second: "E".to_string(),
                evidence: vec!["J".to_string(), "M".to_string()],
            }
        );
        for bare in ["B-E|", "B-E"] {
            match parse_query_line(bare).unwrap() {
                QueryLine::Independence { evidence, .. } => assert!(evidence.is_empty()),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_lines_are_parse_errors() {
        for bad in ["P(B=T", "P(B)", "P(B=T) A--E", "BE|J=T", "-E|"] {
            assert!(
                matches!(parse_query_line(bad), Err(BayesError::Parse(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_queries_skips_comments_and_reports_lines() {
        let queries = parse_queries("# alarm\n\nP(B=T)\nB-E|\n").unwrap();
        assert_eq!(queries.len(), 2);

        match parse_queries("P(B=T)\n\nP(B").unwrap_err() {
            BayesError::Parse(message) => assert!(message.starts_with("line 3:"), "{message}"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_render_answers() {
        let elimination = Answer::Elimination(InferenceResult {
            probability: 0.2841718353643929,
            additions: 7,
            multiplications: 16,
        });
        assert_eq!(elimination.render(5), "0.28417,7,16");
        assert_eq!(elimination.render(2), "0.28,7,16");
        assert_eq!(Answer::Independence { independent: true }.to_string(), "yes");
        assert_eq!(Answer::Independence { independent: false }.to_string(), "no");
    }

    #[test]
    fn test_answer_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Answer::Independence { independent: false }).unwrap();
        assert_eq!(json, r#"{"kind":"independence","independent":false}"#);
    }
}
