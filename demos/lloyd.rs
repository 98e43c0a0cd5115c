use kmeans_session::*;
use rand::prelude::*;

fn main() {
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 100);

    // Generate some random data
    let mut rnd = rand::rngs::StdRng::seed_from_u64(1337);
    let samples: Vec<PointVector<f64>> = (0..sample_cnt)
        .map(|i| PointVector::new(i, (0..sample_dims).map(|_| rnd.gen()).collect()))
        .collect();

    let config = SessionConfig::build()
        .k(k)
        .max_iterations(max_iter)
        .epsilon(1e-4)
        .thread_count(8)
        .build();
    let mut session = KMeansSession::new(&samples, config).expect("valid configuration");
    let outcome = driver::run_to_completion(&mut session, |_| {}).expect("run failed");
    session.dispose();

    println!("Stopped after {} iterations: {:?}", outcome.summary.iterations, outcome.last.stop_reason);
    println!("Error: {:?}", outcome.last.sse);
    println!("Cluster sizes: {:?}", outcome.metrics.size);
    println!("Avg iteration: {:?} (assign {:?}, update {:?})",
        outcome.summary.avg_iteration_time(), outcome.summary.avg_assign_time(), outcome.summary.avg_update_time());
}
