// core/src/pipeline/execution.rs

//! `Pipeline::run`.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop, or the first error
  /// any handler returns. Steps that are not optional must have at least one
  /// handler in some phase, otherwise the run fails with
  /// `FlowError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by its skip condition.");
          continue;
        }
      }

      let phases: [(&str, Option<&Vec<Handler<TData, Err>>>); 3] = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];

      let handler_count: usize = phases.iter().map(|(_, hs)| hs.map_or(0, |v| v.len())).sum();
      if handler_count == 0 {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        for (handler_idx, handler_fn) in handlers.iter().enumerate() {
          let handler_span = span!(parent: &step_span, Level::DEBUG, "handler", phase, handler_index = handler_idx);
          match handler_fn(ctx_data.clone()).instrument(handler_span).await {
            Ok(PipelineControl::Continue) => {}
            Ok(PipelineControl::Stop) => {
              event!(parent: &step_span, Level::INFO, phase, "Pipeline stopped by a handler.");
              return Ok(PipelineResult::Stopped);
            }
            Err(e) => {
              event!(parent: &step_span, Level::WARN, phase, error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }

      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
