use crate::manifest::Test;
use crate::report::TestResult;
use anyhow::{Result, bail};
use time::OffsetDateTime;

type Handler = Box<dyn Fn(&Test) -> Result<()>>;

/// Dispatches the tests of a manifest to a handler chosen by `rdf:type`.
#[derive(Default)]
pub struct TestEvaluator {
    handlers: Vec<(String, Handler)>,
}

impl TestEvaluator {
    /// Registering the same type twice replaces the first handler.
    pub fn register(
        &mut self,
        test_type: impl Into<String>,
        handler: impl Fn(&Test) -> Result<()> + 'static,
    ) {
        let test_type = test_type.into();
        self.handlers.retain(|(registered, _)| *registered != test_type);
        self.handlers.push((test_type, Box::new(handler)));
    }

    fn run(&self, test: &Test) -> Result<()> {
        for kind in &test.kinds {
            if let Some((_, handler)) = self
                .handlers
                .iter()
                .find(|(registered, _)| registered == kind.as_str())
            {
                return handler(test);
            }
        }
        let kinds = test
            .kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        bail!("No handler for the test types {kinds}")
    }

    /// Runs every test. Only a broken manifest stops the run.
    pub fn evaluate(
        &self,
        manifest: impl IntoIterator<Item = Result<Test>>,
    ) -> Result<Vec<TestResult>> {
        let mut results = Vec::new();
        for test in manifest {
            let test = test?;
            let outcome = self.run(&test);
            results.push(TestResult {
                test: test.id,
                outcome,
                date: OffsetDateTime::now_utc(),
            });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Action;
    use relrdf_model::Uri;

    fn test(kinds: &[&str]) -> Test {
        Test {
            id: Uri::new_unchecked("http://example.com/t"),
            kinds: kinds.iter().map(|k| Uri::new_unchecked(*k)).collect(),
            name: None,
            comment: None,
            action: Action::File("http://example.com/q.rq".into()),
            result: None,
        }
    }

    #[test]
    fn first_known_type_wins() {
        let mut evaluator = TestEvaluator::default();
        evaluator.register("http://example.com/Fails", |_| bail!("fails"));
        evaluator.register("http://example.com/Passes", |_| Ok(()));
        let results = evaluator
            .evaluate([
                Ok(test(&["http://example.com/Other", "http://example.com/Passes"])),
                Ok(test(&["http://example.com/Fails"])),
                Ok(test(&["http://example.com/Other"])),
            ])
            .unwrap();
        let outcomes = results.iter().map(|r| r.outcome.is_ok()).collect::<Vec<_>>();
        assert_eq!(outcomes, [true, false, false]);
    }

    #[test]
    fn broken_manifest_stops_the_run() {
        let evaluator = TestEvaluator::default();
        assert!(evaluator.evaluate([Err(anyhow::anyhow!("bad manifest"))]).is_err());
    }
}
