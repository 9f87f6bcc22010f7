use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::{Analysis, AnalysisService, ServiceError};

/// Analyze every file on the blocking pool.
///
/// Results come back in input order. A failing file does not stop the others.
pub async fn run_batch(
    service: Arc<AnalysisService>,
    paths: Vec<PathBuf>,
) -> Vec<(PathBuf, Result<Analysis, ServiceError>)> {
    info!("Analyzing {} input files", paths.len());

    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        let service = Arc::clone(&service);
        tasks.spawn_blocking(move || (index, service.analyze_file(&path)));
    }

    let mut results: Vec<Option<Result<Analysis, ServiceError>>> =
        paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Err(e) = &result {
                    error!("Analysis of {} failed: {}", paths[index].display(), e);
                }
                results[index] = Some(result);
            }
            Err(e) => error!("Analysis task failed: {}", e),
        }
    }

    paths
        .into_iter()
        .zip(results)
        .map(|(path, result)| {
            let result = result.unwrap_or_else(|| {
                Err(ServiceError::Task(format!("no result for {}", path.display())))
            });
            (path, result)
        })
        .collect()
}
