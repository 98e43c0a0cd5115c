use kmeans_session::*;
use std::{thread, time::Duration};

fn main() {
    let samples: Vec<PointVector<f64>> = [
        [0.0, 0.0], [0.0, 1.0], [1.0, 0.5],
        [10.0, 10.0], [10.0, 11.0], [11.0, 10.5],
        [-8.0, 9.0], [-9.0, 9.5], [-8.5, 10.0],
    ].iter().enumerate().map(|(i, s)| PointVector::new(i, s.to_vec())).collect();

    let config = SessionConfig::build().k(3).max_iterations(20).epsilon(1e-6).thread_count(2).build();
    let mut session = KMeansSession::new(&samples, config).expect("valid configuration");

    // Step mode: the caller decides when to run the next iteration
    let mut history = Vec::new();
    while session.state() != SessionState::Finished {
        let snapshot = session.advance().expect("iteration failed");
        println!("Iteration {}: sse={:?} shift={:?} moved={} assignments={:?}",
            snapshot.iteration, snapshot.sse, snapshot.shift, snapshot.changed, snapshot.assignments);
        history.push(snapshot);
        thread::sleep(Duration::from_millis(50));
    }
    session.dispose();

    if let Some(last) = history.last() {
        println!("Stopped: {:?}", last.stop_reason);
        for ci in 0..last.k {
            println!("Centroid {}: {:?}", ci, last.centroid(ci));
        }
    }
}
