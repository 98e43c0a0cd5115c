use kmeans_session::*;
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG=kmeans_session=debug shows every iteration as the library logs it
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (sample_cnt, sample_dims, k, max_iter) = (20000, 16, 6, 2500);

    // Generate some random data
    let mut rnd = rand::rngs::StdRng::seed_from_u64(42);
    let samples: Vec<PointVector<f32>> = (0..sample_cnt)
        .map(|i| PointVector::new(i, (0..sample_dims).map(|_| rnd.gen()).collect()))
        .collect();

    let config = SessionConfig::build()
        .k(k)
        .max_iterations(max_iter)
        .epsilon(1e-5)
        .random_seed(7)
        .thread_count(4)
        .build();
    let mut session = KMeansSession::new(&samples, config).expect("valid configuration");

    let mut prev_sse: Option<f32> = None;
    let outcome = driver::run_to_completion(&mut session, |s| {
        if let (Some(prev), Some(sse)) = (prev_sse, s.sse) {
            println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.4} | moved: {} | {:.3} ms",
                s.iteration, prev, sse, prev - sse, s.changed, s.total_ms());
        }
        prev_sse = s.sse;
    }).expect("run failed");
    session.dispose();

    for (ci, size) in outcome.metrics.size.iter().enumerate() {
        println!("Cluster {}: {} samples, sse {:.2}, avg dist {:.3}, max dist {:.3}",
            ci, size, outcome.metrics.sse[ci], outcome.metrics.avg_dist[ci], outcome.metrics.max_dist[ci]);
    }
}
