//! Three-pass commit protocol and rollback order, independent of the concrete actions.

use logweave::{Error, Level, internal};
use logweave::configuration::{ActionLog, ConfigAction};

#[derive(Debug, Default)]
struct Step {
    id: usize,
    fail_validate: bool,
    fail_pre: bool,
    fail_post: bool,
    fail_rollback: bool,
}

impl Step {
    fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

fn failure(what: &str) -> Error {
    Error::Unsupported(what.to_string())
}

impl ConfigAction for Step {
    type State = Vec<String>;
    type Prepared = usize;

    fn validate(&self, _state: &Vec<String>) -> Result<usize, Error> {
        if self.fail_validate {
            return Err(failure("validate"));
        }
        Ok(self.id)
    }

    fn apply_pre_create(&self, state: &mut Vec<String>, prepared: &usize) -> Result<(), Error> {
        state.push(format!("pre{prepared}"));
        if self.fail_pre {
            return Err(failure("pre"));
        }
        Ok(())
    }

    fn apply_post_create(&self, state: &mut Vec<String>, prepared: &usize) -> Result<(), Error> {
        state.push(format!("post{prepared}"));
        if self.fail_post {
            return Err(failure("post"));
        }
        Ok(())
    }

    fn rollback(&self, state: &mut Vec<String>) -> Result<(), Error> {
        state.push(format!("rollback{}", self.id));
        if self.fail_rollback {
            return Err(failure("rollback"));
        }
        Ok(())
    }
}

fn log_of(steps: Vec<Step>) -> ActionLog<Step> {
    let mut log = ActionLog::new();
    for step in steps {
        log.push(step);
    }
    log
}

#[test]
fn validation_failure_applies_nothing() {
    let mut log = log_of(vec![
        Step::new(1),
        Step::new(2),
        Step {
            fail_validate: true,
            ..Step::new(3)
        },
        Step::new(4),
    ]);
    let mut events = Vec::new();

    let result = log.commit(&mut events);

    assert!(result.is_err());
    assert!(events.is_empty());
    assert_eq!(log.len(), 4);
}

#[test]
fn every_pre_create_runs_before_any_post_create() {
    let mut log = log_of(vec![Step::new(1), Step::new(2), Step::new(3)]);
    let mut events = Vec::new();

    log.commit(&mut events).unwrap();

    assert_eq!(
        events,
        ["pre1", "pre2", "pre3", "post1", "post2", "post3"]
    );
}

#[test]
fn apply_failures_are_suppressed() {
    let mut log = log_of(vec![
        Step {
            fail_pre: true,
            ..Step::new(1)
        },
        Step {
            fail_post: true,
            ..Step::new(2)
        },
        Step::new(3),
    ]);
    let mut events = Vec::new();

    assert!(log.commit(&mut events).is_ok());
    assert_eq!(
        events,
        ["pre1", "pre2", "pre3", "post1", "post2", "post3"]
    );
    assert!(log.is_empty());
}

#[test]
fn rollback_runs_in_reverse_even_when_one_fails() {
    let mut log = log_of(vec![
        Step::new(1),
        Step {
            fail_rollback: true,
            ..Step::new(2)
        },
        Step::new(3),
    ]);
    let mut events = Vec::new();

    log.rollback(&mut events);

    assert_eq!(events, ["rollback3", "rollback2", "rollback1"]);
    assert!(log.is_empty());
}

#[test]
fn drained_queue_makes_commit_and_rollback_no_ops() {
    let mut log = log_of(vec![Step::new(1)]);
    let mut events = Vec::new();

    log.commit(&mut events).unwrap();
    assert!(log.is_empty());
    let after_commit = events.len();

    log.commit(&mut events).unwrap();
    log.rollback(&mut events);
    assert_eq!(events.len(), after_commit);
}

#[test]
fn failed_commit_keeps_queue_for_rollback() {
    let mut log = log_of(vec![
        Step::new(1),
        Step {
            fail_validate: true,
            ..Step::new(2)
        },
    ]);
    let mut events = Vec::new();

    assert!(log.commit(&mut events).is_err());
    log.rollback(&mut events);

    assert_eq!(events, ["rollback2", "rollback1"]);
}

#[test]
fn queueing_skips_trace_formatting_by_default() {
    assert!(!internal::enabled("JOURNAL", Level::Trace));
    assert!(internal::enabled("JOURNAL", Level::Error));

    let mut log = ActionLog::new();
    log.push(Step::new(1));
    assert_eq!(log.len(), 1);
}
