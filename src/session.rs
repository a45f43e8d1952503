//! One operator session: a variant controller plus its submission pipeline

use crate::client::StrategyApi;
use crate::controller::VariantController;
use crate::error::LaunchResult;
use crate::pipeline::{LaunchReceipt, PipelineState, SubmissionPipeline};

pub struct LaunchSession<A> {
    controller: VariantController,
    pipeline: SubmissionPipeline<A>,
}

impl<A: StrategyApi> LaunchSession<A> {
    pub fn new(api: A) -> Self {
        Self::with_controller(api, VariantController::new())
    }

    pub fn with_controller(api: A, controller: VariantController) -> Self {
        Self {
            controller,
            pipeline: SubmissionPipeline::new(api),
        }
    }

    pub fn controller(&self) -> &VariantController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut VariantController {
        &mut self.controller
    }

    pub fn pipeline(&self) -> &SubmissionPipeline<A> {
        &self.pipeline
    }

    pub fn last_state(&self) -> PipelineState {
        self.pipeline.state()
    }

    /// Submit the active configuration
    ///
    /// Fails with `NoVariantSelected` before the pipeline runs when the
    /// operator has not chosen an order type.
    pub async fn submit(&self) -> LaunchResult<LaunchReceipt> {
        let config = self.controller.active_configuration()?;
        self.pipeline.submit(config).await
    }
}
