pub mod build_reconciler;
pub mod controller;
pub mod kube_store;
pub mod pipelinerun_reconciler;
pub mod traits;

#[cfg(test)]
pub mod testing;
