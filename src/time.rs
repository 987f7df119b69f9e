use crate::prelude::*;

/// Awaits `fut`, logging how long it took.
pub(crate) async fn logged<F: Future>(name: &str, fut: F) -> F::Output {
    let start = Instant::now();
    let output = fut.await;
    log::debug!("{name} finished in {} ms", start.elapsed().as_millis());
    output
}
