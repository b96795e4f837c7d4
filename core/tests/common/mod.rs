// core/tests/common/mod.rs
#![allow(dead_code)]

use flowline::{ContextData, FlowError, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// A toy checkout tally: steps add line amounts and record that they ran.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub total_cents: i64,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
  pub cash_on_delivery: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError is not PartialEq, so keep its Debug rendering for assertions.
  #[error("flowline error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

/// Adds `amount_cents` to the tally and stops when the step is the configured stop point.
pub fn add_line(step_name: &'static str, amount_cents: i64) -> flowline::Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += amount_cents;
      guard.trail.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, total = guard.total_cents, "line added");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn fail_with(step_name: &'static str, message: &'static str) -> flowline::Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      ctx.write().trail.push(step_name.to_string());
      Err(TestError::Step(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
