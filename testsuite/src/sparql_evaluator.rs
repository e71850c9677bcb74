use crate::evaluator::TestEvaluator;
use crate::files::{Graph, guess_rdf_format, load_graph, read_file, read_file_to_string};
use crate::manifest::{Action, Test};
use crate::vocab::rs;
use anyhow::{Context, Result, bail};
use relrdf::import::import;
use relrdf::sinks::Sink;
use relrdf::{ModelBase, ModelConfig, QueryLanguage, QueryResults};
use relrdf_algebra::{NotSupportedError, QueryParser};
use relrdf_model::vocab::rdf;
use relrdf_model::{BlankNode, Literal, Term, Uri};
use relrdf_results::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
use std::collections::HashMap;
use std::fmt;

const MF: &str = "http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#";

pub fn register_sparql_tests(evaluator: &mut TestEvaluator) {
    for kind in ["PositiveSyntaxTest", "PositiveSyntaxTest11"] {
        evaluator.register(format!("{MF}{kind}"), evaluate_positive_syntax_test);
    }
    for kind in ["NegativeSyntaxTest", "NegativeSyntaxTest11"] {
        evaluator.register(format!("{MF}{kind}"), evaluate_negative_syntax_test);
    }
    evaluator.register(format!("{MF}QueryEvaluationTest"), evaluate_evaluation_test);
}

/// SerQL queries are recognized by their extension.
fn query_language(url: &str) -> QueryLanguage {
    if url.ends_with(".serql") {
        QueryLanguage::Serql
    } else {
        QueryLanguage::Sparql
    }
}

fn query_parser(url: &str) -> Result<QueryParser> {
    QueryParser::new(query_language(url))
        .with_file_name(url)
        .with_base_iri(url)
        .with_context(|| format!("Invalid query URL {url}"))
}

fn evaluate_positive_syntax_test(test: &Test) -> Result<()> {
    let query_file = test.action_file()?;
    query_parser(query_file)?
        .parse(&read_file_to_string(query_file)?)
        .with_context(|| format!("Not able to parse {test}"))?;
    Ok(())
}

fn evaluate_negative_syntax_test(test: &Test) -> Result<()> {
    let query_file = test.action_file()?;
    match query_parser(query_file)?.parse(&read_file_to_string(query_file)?) {
        Ok(result) => bail!("Parses even if it should not {test}. The output tree is: {result}"),
        Err(_) => Ok(()),
    }
}

fn evaluate_evaluation_test(test: &Test) -> Result<()> {
    let Action::Query {
        data, graph_data, ..
    } = &test.action
    else {
        bail!("{test} should have a query as action");
    };
    if !graph_data.is_empty() {
        bail!(NotSupportedError::new(None, "Named graph data"));
    }
    let modelbase = ModelBase::open_in_memory()?;
    if let Some(data) = data {
        load_version(&modelbase, data, 1)?;
    }
    let query_file = test.query_file()?;
    let query = read_file_to_string(query_file)?;
    let model = modelbase.model(&ModelConfig::single_version(1))?;
    let actual_results = model
        .query_named(query_language(query_file), &query, query_file)
        .with_context(|| format!("Failure to execute query of {test}"))?;
    let result_file = test.result.as_deref().context("No tests result found")?;
    let expected_results = load_query_results(result_file)
        .with_context(|| format!("Error constructing expected results for {test}"))?;
    let actual_results = StaticQueryResults::from_query_results(actual_results)?;
    if are_query_results_isomorphic(&expected_results, &actual_results) {
        Ok(())
    } else {
        bail!(
            "Failure on {test}.\nExpected file:\n{expected_results}\nOutput file:\n{actual_results}\nCompiled query:\n{}\n",
            model.compile(query_language(query_file), &query, query_file)?
        )
    }
}

fn load_version(modelbase: &ModelBase, url: &str, version: u32) -> Result<()> {
    let mut sink = modelbase.version_sink(version)?;
    if let Err(error) = import(&mut sink, read_file(url)?, guess_rdf_format(url)?, Some(url)) {
        sink.rollback()?;
        return Err(error).with_context(|| format!("Failed to load {url}"));
    }
    sink.close()?;
    Ok(())
}

fn load_query_results(url: &str) -> Result<StaticQueryResults> {
    if url.ends_with(".srx") {
        StaticQueryResults::from_xml(url)
    } else {
        StaticQueryResults::from_graph(&load_graph(url)?)
    }
}

/// The bound values of a solution, sorted by variable name.
type Solution = Vec<(String, Term)>;

#[derive(Debug)]
enum StaticQueryResults {
    Solutions {
        variables: Vec<String>,
        solutions: Vec<Solution>,
        ordered: bool,
    },
    Boolean(bool),
}

impl StaticQueryResults {
    fn from_query_results(results: QueryResults<'_>) -> Result<Self> {
        let variables = results.column_names().to_vec();
        let solutions = results
            .map(|row| Ok(to_solution(&variables, row?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Solutions {
            variables: sorted(variables),
            solutions,
            ordered: false,
        })
    }

    fn from_xml(url: &str) -> Result<Self> {
        match QueryResultsParser::from_format(QueryResultsFormat::Xml).for_reader(read_file(url)?)? {
            QueryResultsReader::Boolean(value) => Ok(Self::Boolean(value)),
            QueryResultsReader::Solutions(reader) => {
                let variables = reader.variables().to_vec();
                let solutions = reader
                    .map(|row| Ok(to_solution(&variables, row?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Solutions {
                    variables: sorted(variables),
                    solutions,
                    ordered: false,
                })
            }
        }
    }

    /// Reads an `rs:ResultSet` description.
    fn from_graph(graph: &Graph) -> Result<Self> {
        let result_set_type = Term::from(Uri::from(rs::RESULT_SET));
        let result_set = graph
            .subjects_for_predicate_object(rdf::TYPE, &result_set_type)
            .next()
            .context("No rs:ResultSet found")?;
        if let Some(value) = graph.object_for_subject_predicate(result_set, rs::BOOLEAN) {
            return Ok(Self::Boolean(*value == Term::from(Literal::from(true))));
        }
        let variables = graph
            .objects_for_subject_predicate(result_set, rs::RESULT_VARIABLE)
            .filter_map(|v| match v {
                Term::Literal(v) => Some(v.value().to_owned()),
                _ => None,
            })
            .collect();
        let mut solutions = graph
            .objects_for_subject_predicate(result_set, rs::SOLUTION)
            .map(|solution| {
                let bindings = graph
                    .objects_for_subject_predicate(solution, rs::BINDING)
                    .filter_map(|binding| {
                        match (
                            graph.object_for_subject_predicate(binding, rs::VARIABLE),
                            graph.object_for_subject_predicate(binding, rs::VALUE),
                        ) {
                            (Some(Term::Literal(variable)), Some(value)) => {
                                Some((variable.value().to_owned(), value.clone()))
                            }
                            _ => None,
                        }
                    })
                    .collect::<Vec<_>>();
                let index = match graph.object_for_subject_predicate(solution, rs::INDEX) {
                    Some(Term::Literal(index)) => index.value().parse::<u64>().ok(),
                    _ => None,
                };
                (sorted(bindings), index)
            })
            .collect::<Vec<_>>();
        solutions.sort_by_key(|(_, index)| *index);
        let ordered = !solutions.is_empty() && solutions.iter().all(|(_, index)| index.is_some());
        Ok(Self::Solutions {
            variables: sorted(variables),
            solutions: solutions.into_iter().map(|(solution, _)| solution).collect(),
            ordered,
        })
    }
}

impl fmt::Display for StaticQueryResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solutions {
                variables,
                solutions,
                ..
            } => {
                write!(f, "Variables:")?;
                for v in variables {
                    write!(f, " ?{v}")?;
                }
                for solution in solutions {
                    write!(f, "\n{{")?;
                    for (k, v) in solution {
                        write!(f, "?{k} = {v} ")?;
                    }
                    write!(f, "}}")?;
                }
                Ok(())
            }
            Self::Boolean(b) => b.fmt(f),
        }
    }
}

fn to_solution(variables: &[String], row: Vec<Option<Term>>) -> Solution {
    sorted(
        variables
            .iter()
            .zip(row)
            .filter_map(|(variable, value)| Some((variable.clone(), value?)))
            .collect(),
    )
}

fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    values.sort();
    values
}

fn are_query_results_isomorphic(expected: &StaticQueryResults, actual: &StaticQueryResults) -> bool {
    match (expected, actual) {
        (
            StaticQueryResults::Solutions {
                variables: expected_variables,
                solutions: expected_solutions,
                ordered,
            },
            StaticQueryResults::Solutions {
                variables: actual_variables,
                solutions: actual_solutions,
                ..
            },
        ) => {
            expected_variables == actual_variables
                && are_solutions_isomorphic(expected_solutions, actual_solutions, *ordered)
        }
        (StaticQueryResults::Boolean(expected), StaticQueryResults::Boolean(actual)) => {
            expected == actual
        }
        _ => false,
    }
}

/// Compares two multisets of solutions, looking for a blank node bijection shared by all of them.
fn are_solutions_isomorphic(expected: &[Solution], actual: &[Solution], ordered: bool) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut mapping = BlankNodeMapping::default();
    if ordered {
        expected
            .iter()
            .zip(actual)
            .all(|(expected, actual)| mapping.unify(expected, actual))
    } else {
        let mut used = vec![false; actual.len()];
        match_solutions(expected, actual, &mut used, &mut mapping)
    }
}

fn match_solutions(
    expected: &[Solution],
    actual: &[Solution],
    used: &mut [bool],
    mapping: &mut BlankNodeMapping,
) -> bool {
    let Some((first, rest)) = expected.split_first() else {
        return true;
    };
    for (i, candidate) in actual.iter().enumerate() {
        if used[i] {
            continue;
        }
        let mut extended = mapping.clone();
        if extended.unify(first, candidate) {
            used[i] = true;
            if match_solutions(rest, actual, used, &mut extended) {
                *mapping = extended;
                return true;
            }
            used[i] = false;
        }
    }
    false
}

#[derive(Default, Clone)]
struct BlankNodeMapping {
    forward: HashMap<BlankNode, BlankNode>,
    backward: HashMap<BlankNode, BlankNode>,
}

impl BlankNodeMapping {
    /// Extends the mapping so that `expected` maps to `actual`, if possible.
    fn unify(&mut self, expected: &Solution, actual: &Solution) -> bool {
        expected.len() == actual.len()
            && expected.iter().zip(actual).all(
                |((expected_variable, expected_value), (actual_variable, actual_value))| {
                    expected_variable == actual_variable
                        && match (expected_value, actual_value) {
                            (Term::BlankNode(e), Term::BlankNode(a)) => self.bind(e, a),
                            (e, a) => e == a,
                        }
                },
            )
    }

    fn bind(&mut self, expected: &BlankNode, actual: &BlankNode) -> bool {
        match (self.forward.get(expected), self.backward.get(actual)) {
            (Some(a), Some(e)) => a == actual && e == expected,
            (None, None) => {
                self.forward.insert(expected.clone(), actual.clone());
                self.backward.insert(actual.clone(), expected.clone());
                true
            }
            _ => false,
        }
    }
}
