use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use build_core::{
    crds::{BuildResource, PipelineRun},
    formatters::KIND_LABEL,
};
use futures::StreamExt;
use http_common::handlers::HealthState;
use kube::{
    Api, Client, ResourceExt,
    runtime::{Controller, controller::Action, watcher},
};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AppError,
    services::{
        build_reconciler::BuildReconciler,
        kube_store::{KubeObjectStore, KubePipelineExecutor},
    },
};

/// Flips readiness once every enabled controller has started watching.
pub struct StartupGate {
    health: HealthState,
    pending: AtomicUsize,
}

impl StartupGate {
    pub fn new(health: HealthState, controllers: usize) -> Self {
        if controllers == 0 {
            health.mark_ready();
        }
        Self {
            health,
            pending: AtomicUsize::new(controllers),
        }
    }

    pub fn controller_started(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.health.mark_ready();
            info!("✅ All controllers are watching");
        }
    }
}

/// Shared by every controller of the process.
pub struct Context {
    pub reconciler: BuildReconciler<KubeObjectStore, KubePipelineExecutor>,
    pub requeue_after: Duration,
    pub error_requeue_after: Duration,
    pub startup: StartupGate,
}

impl Context {
    pub fn new(client: Client, cfg: &Config, startup: StartupGate) -> Self {
        Self {
            reconciler: BuildReconciler::new(
                KubeObjectStore::new(client.clone()),
                KubePipelineExecutor::new(client),
                cfg.pipeline.clone(),
                cfg.retry.clone(),
            ),
            requeue_after: Duration::from_secs(cfg.controller.requeue_after_secs),
            error_requeue_after: Duration::from_secs(cfg.controller.error_requeue_secs),
            startup,
        }
    }
}

/// Watches one build resource kind and the pipeline runs it owns until the
/// watch stream ends.
pub async fn start_controller<K: BuildResource>(
    client: Client,
    ctx: Arc<Context>,
) -> Result<(), AppError> {
    let resources: Api<K> = Api::all(client.clone());
    let runs: Api<PipelineRun> = Api::all(client);
    let owned_runs = watcher::Config::default().labels(&format!("{}={}", KIND_LABEL, K::PREFIX));

    info!(kind = K::PREFIX, "🔄 Starting controller");

    let stream = Controller::new(resources, watcher::Config::default())
        .owns(runs, owned_runs)
        .run(reconcile::<K>, error_policy::<K>, ctx.clone());
    ctx.startup.controller_started();

    stream
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(name = %object.name, namespace = ?object.namespace, ?action, "✅ Reconciled")
                }
                Err(e) => warn!(error = %e, "⚠️ Reconcile failed"),
            }
        })
        .await;

    warn!(kind = K::PREFIX, "Controller stream ended");

    Ok(())
}

async fn reconcile<K: BuildResource>(object: Arc<K>, ctx: Arc<Context>) -> Result<Action, AppError> {
    let name = object.name_any();
    let namespace = object
        .namespace()
        .ok_or_else(|| AppError::MissingNamespace(name.clone()))?;

    let outcome = ctx.reconciler.reconcile::<K>(&namespace, &name).await?;

    if outcome.requeue() {
        Ok(Action::requeue(ctx.requeue_after))
    } else {
        Ok(Action::await_change())
    }
}

fn error_policy<K: BuildResource>(object: Arc<K>, error: &AppError, ctx: Arc<Context>) -> Action {
    warn!(
        name = %object.name_any(),
        error = %error,
        "⚠️ Reconcile error, requeueing in {:?}",
        ctx.error_requeue_after
    );
    Action::requeue(ctx.error_requeue_after)
}
